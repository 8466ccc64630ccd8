//! Per-run count series and the aggregation-time scan.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::model::{SiteId, Snapshot};

use super::sink::SnapshotSink;

/// `species_or_site -> count` for one tick.
pub type TickCounts = BTreeMap<String, u32>;

/// `{run_id: {tick_id: {species_or_site: count}}}`, the layout consumed by the analysis
/// layer. Site keys are `site_<id>` and count agents on the site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesCollector {
    runs: BTreeMap<u32, BTreeMap<u64, TickCounts>>,
    #[serde(skip)]
    current_run: u32,
}

impl SeriesCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route subsequent snapshots to `run`.
    pub fn start_run(&mut self, run: u32) {
        self.current_run = run;
        self.runs.entry(run).or_default();
    }

    pub fn current_run(&self) -> u32 {
        self.current_run
    }

    pub fn runs(&self) -> &BTreeMap<u32, BTreeMap<u64, TickCounts>> {
        &self.runs
    }

    pub fn run(&self, run: u32) -> Option<&BTreeMap<u64, TickCounts>> {
        self.runs.get(&run)
    }

    pub fn to_json_string(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), SimError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// For each run, the first tick of the first `streak`-tick stretch during which
    /// `key` stayed at `capacity`. `None` for runs that never got there.
    pub fn full_aggregation_ticks(
        &self,
        key: &str,
        capacity: u32,
        streak: u64,
    ) -> BTreeMap<u32, Option<u64>> {
        self.runs
            .iter()
            .map(|(run, ticks)| {
                let series = ticks
                    .iter()
                    .map(|(tick, counts)| (*tick, counts.get(key).copied().unwrap_or(0)));
                (*run, first_streak(series, capacity, streak))
            })
            .collect()
    }
}

impl SnapshotSink for SeriesCollector {
    fn record(&mut self, snapshot: &Snapshot) -> Result<(), SimError> {
        self.runs
            .entry(self.current_run)
            .or_default()
            .insert(snapshot.tick, snapshot.flat_counts());
        Ok(())
    }
}

/// First tick of the first run of `streak` consecutive ticks in which the still agents
/// on `site` number exactly `capacity`.
pub fn find_full_aggregation(
    snapshots: &[Snapshot],
    site: SiteId,
    capacity: u32,
    streak: u64,
) -> Option<u64> {
    first_streak(
        snapshots.iter().map(|s| (s.tick, s.site(site).still)),
        capacity,
        streak,
    )
}

/// Streak detector over `(tick, value)` pairs in ascending tick order.
///
/// Streak length is measured in ticks from the first matching sample through the
/// current one, so sparsely sampled series work as well as per-tick ones.
pub(crate) fn first_streak(
    series: impl IntoIterator<Item = (u64, u32)>,
    target: u32,
    streak: u64,
) -> Option<u64> {
    let mut watch = StreakWatch::new(target, streak);
    series
        .into_iter()
        .find_map(|(tick, value)| watch.observe(tick, value))
}

/// Incremental form of the streak scan, for stopping a run as soon as it completes.
#[derive(Debug, Clone)]
pub struct StreakWatch {
    target: u32,
    streak: u64,
    start: Option<u64>,
}

impl StreakWatch {
    pub fn new(target: u32, streak: u64) -> Self {
        Self {
            target,
            streak,
            start: None,
        }
    }

    /// Feed the next sample. Returns the streak's first tick once it is long enough.
    pub fn observe(&mut self, tick: u64, value: u32) -> Option<u64> {
        if value != self.target {
            self.start = None;
            return None;
        }
        let first = *self.start.get_or_insert(tick);
        (tick + 1 - first >= self.streak).then_some(first)
    }

    /// Watch the still agents on `site` in each snapshot.
    pub fn observe_site(&mut self, snapshot: &Snapshot, site: SiteId) -> Option<u64> {
        self.observe(snapshot.tick, snapshot.site(site).still)
    }
}
