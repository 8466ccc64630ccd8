use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy_app::App;
use serde::Serialize;

use crate::behavior::Behavior;
use crate::config::SimConfig;
use crate::ecs::components::{Agent, Heading, Position};
use crate::ecs::resources::{AgentRegistry, EcsSimConfig, SnapshotLog};
use crate::ecs::spawn::spawn_initial_population;
use crate::ecs::{SimClock, SimTick, build_sim_app_for};
use crate::error::{ConfigError, SimError};
use crate::flush::{SeriesCollector, SnapshotSink};
use crate::id::AgentId;
use crate::model::{Snapshot, Species, Vec2};

/// Cooperative stop flag, checked between ticks.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a `run` / `run_until` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks_run: u64,
    /// Id of the last tick executed, if any.
    pub last_tick: Option<u64>,
    /// Halted through the `StopHandle`.
    pub stopped: bool,
    /// Tick at which the `run_until` predicate first held.
    pub matched_at: Option<u64>,
    pub final_counts: BTreeMap<Species, u32>,
}

/// Read-only view of one agent for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    pub species: Species,
    pub position: Vec2,
    pub heading: Vec2,
    pub state: &'static str,
}

/// A configured run: the headless app plus its initial population.
pub struct Simulation {
    app: App,
    stop: StopHandle,
    exhausted: BTreeSet<Species>,
}

impl Simulation {
    /// Validate `config`, build the app and place the starting population.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let mut app = build_sim_app_for(&config)?;
        spawn_initial_population(app.world_mut());
        tracing::info!(
            seed = config.seed,
            agents = app.world().resource::<AgentRegistry>().len(),
            sites = config.sites.len(),
            "simulation ready"
        );
        Ok(Self {
            app,
            stop: StopHandle::default(),
            exhausted: BTreeSet::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.app.world().resource::<EcsSimConfig>().0
    }

    /// Id of the next tick to run.
    pub fn current_tick(&self) -> u64 {
        self.app.world().resource::<SimClock>().tick_count
    }

    pub fn live_count(&self) -> usize {
        self.app.world().resource::<AgentRegistry>().len()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run one full tick and return its snapshot.
    ///
    /// `None` only if something removed the snapshot recorder from the schedule.
    pub fn tick(&mut self) -> Option<Snapshot> {
        let world = self.app.world_mut();
        world.run_schedule(SimTick);
        let snapshot = world.resource_mut::<SnapshotLog>().drain().pop();
        if let Some(snapshot) = &snapshot {
            self.note_exhaustion(snapshot);
        }
        snapshot
    }

    /// Run until `duration` is reached or the stop handle fires.
    /// A `duration` of 0 runs until stopped.
    pub fn run(&mut self, sink: &mut dyn SnapshotSink) -> Result<RunSummary, SimError> {
        self.run_until(sink, |_| false)
    }

    /// Like `run`, but also ends after the first tick whose snapshot satisfies `predicate`.
    pub fn run_until(
        &mut self,
        sink: &mut dyn SnapshotSink,
        mut predicate: impl FnMut(&Snapshot) -> bool,
    ) -> Result<RunSummary, SimError> {
        let duration = self.config().duration;
        tracing::info!(
            seed = self.config().seed,
            start = self.current_tick(),
            duration,
            "run started"
        );

        let mut summary = RunSummary {
            ticks_run: 0,
            last_tick: None,
            stopped: false,
            matched_at: None,
            final_counts: BTreeMap::new(),
        };
        loop {
            if duration != 0 && self.current_tick() >= duration {
                break;
            }
            if self.stop.is_stopped() {
                summary.stopped = true;
                break;
            }
            let Some(snapshot) = self.tick() else {
                tracing::warn!(tick = self.current_tick(), "tick produced no snapshot");
                break;
            };
            sink.record(&snapshot)?;
            summary.ticks_run += 1;
            summary.last_tick = Some(snapshot.tick);
            let matched = predicate(&snapshot);
            summary.final_counts = snapshot.counts;
            if matched {
                summary.matched_at = summary.last_tick;
                break;
            }
        }
        sink.finish()?;

        tracing::info!(
            ticks = summary.ticks_run,
            stopped = summary.stopped,
            matched_at = ?summary.matched_at,
            live = self.live_count(),
            "run finished"
        );
        Ok(summary)
    }

    /// Every live agent, sorted by id.
    pub fn agents(&mut self) -> Vec<AgentView> {
        let world = self.app.world_mut();
        let mut views: Vec<AgentView> = world
            .query::<(&Agent, &Position, &Heading, &Behavior)>()
            .iter(world)
            .map(|(agent, position, heading, state)| AgentView {
                id: agent.id,
                species: agent.species,
                position: position.0,
                heading: heading.0,
                state: state.label(),
            })
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    fn note_exhaustion(&mut self, snapshot: &Snapshot) {
        let population = &self.app.world().resource::<EcsSimConfig>().0.population;
        let initial = [
            (Species::Predator, population.predators),
            (Species::Prey, population.prey),
            (Species::AggregationAgent, population.aggregation_agents),
        ];
        for (species, count) in initial {
            if count > 0 && snapshot.count(species) == 0 && self.exhausted.insert(species) {
                tracing::info!(%species, tick = snapshot.tick, "species exhausted");
            }
        }
    }
}

/// Run `runs` independent simulations with seeds `config.seed + run_id` (run ids start
/// at 1), recording each into `collector` under its run id.
pub fn run_batch(
    config: &SimConfig,
    runs: u32,
    collector: &mut SeriesCollector,
) -> Result<(), SimError> {
    if config.duration == 0 {
        return Err(ConfigError::Zero { field: "duration" }.into());
    }
    for run in 1..=runs {
        let seed = config.seed.wrapping_add(u64::from(run));
        let mut simulation = Simulation::new(config.clone().with_seed(seed))?;
        collector.start_run(run);
        simulation.run(collector)?;
        tracing::info!(run, runs, seed, "batch run complete");
    }
    Ok(())
}
