use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::site::SiteId;
use super::species::Species;
use crate::id::AgentId;

/// Per-site occupancy at the end of a tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCount {
    /// Agents whose position lies within the site bounds.
    pub on_site: u32,
    /// Aggregation agents in the still state within the site bounds.
    pub still: u32,
}

/// Optional per-agent scalars recorded for later analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentAnnotation {
    pub id: AgentId,
    pub species: Species,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
}

/// Aggregated state emitted once per tick, after lifecycle mutations were committed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub counts: BTreeMap<Species, u32>,
    pub sites: BTreeMap<SiteId, SiteCount>,
    pub births: u32,
    pub deaths: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<AgentAnnotation>>,
}

impl Snapshot {
    pub fn count(&self, species: Species) -> u32 {
        self.counts.get(&species).copied().unwrap_or(0)
    }

    pub fn site(&self, site: SiteId) -> SiteCount {
        self.sites.get(&site).copied().unwrap_or_default()
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Flat `species_or_site -> count` view consumed by the analysis layer.
    /// Site entries count agents on the site.
    pub fn flat_counts(&self) -> BTreeMap<String, u32> {
        let mut flat: BTreeMap<String, u32> = self
            .counts
            .iter()
            .map(|(species, count)| (species.to_string(), *count))
            .collect();
        for (site, count) in &self.sites {
            flat.insert(site.to_string(), count.on_site);
        }
        flat
    }
}
