use bevy_ecs::resource::Resource;
use bevy_ecs::world::World;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::SimConfig;
use crate::model::{Site, Snapshot};
use crate::spatial::SpatialIndex;
use crate::stochastic::derive_seed;

/// Immutable run configuration.
#[derive(Resource, Debug, Clone)]
pub struct EcsSimConfig(pub SimConfig);

/// Deterministic RNG for the simulation.
///
/// `rng` is only used outside the tick (initial placement); per-tick randomness comes
/// from streams derived from `seed`.
#[derive(Resource)]
pub struct SimRng {
    pub rng: SmallRng,
    pub seed: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Per-tick RNG for the lifecycle applicator (newborn headings).
#[derive(Resource)]
pub struct LifecycleRng(pub SmallRng);

impl Default for LifecycleRng {
    fn default() -> Self {
        Self(SmallRng::seed_from_u64(0))
    }
}

/// Aggregation sites, in configuration order.
#[derive(Resource, Debug, Clone, Default)]
pub struct SiteMap(pub Vec<Site>);

/// Proximity index over every registered agent, rebuilt at the start of each tick.
#[derive(Resource, Debug, Clone)]
pub struct EcsSpatialIndex(pub SpatialIndex);

/// Snapshots recorded but not yet handed to a sink.
#[derive(Resource, Debug, Clone, Default)]
pub struct SnapshotLog(pub Vec<Snapshot>);

impl SnapshotLog {
    pub fn drain(&mut self) -> Vec<Snapshot> {
        std::mem::take(&mut self.0)
    }
}

/// Exclusive system that re-seeds the per-tick RNGs.
/// Runs in `SimPhase::PreUpdate` before any other system.
pub fn distribute_rng(world: &mut World) {
    let seed = world.resource::<SimRng>().seed;
    let tick = world.resource::<crate::ecs::clock::SimClock>().tick_count;
    world.resource_mut::<LifecycleRng>().0 =
        SmallRng::seed_from_u64(derive_seed(seed, "lifecycle", tick, 0));
}
