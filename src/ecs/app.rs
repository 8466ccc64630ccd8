use bevy_app::App;
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs};

use super::clock::SimClock;
use super::commands::{LastCommit, apply_lifecycle_mutations};
use super::resources::{
    AgentRegistry, EcsSimConfig, EcsSpatialIndex, LifecycleRng, SimRng, SiteMap, SnapshotLog,
    distribute_rng,
};
use super::schedule::{SimPhase, configure_sim_schedule};
use super::systems::add_simulation_systems;
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::spatial::SpatialIndex;

/// Build a headless Bevy app with simulation clock, core resources,
/// the per-tick systems and the lifecycle applicator. No agents are spawned.
///
/// Manual tick control:
/// ```no_run
/// # use swarm_sim::config::SimConfig;
/// # use swarm_sim::ecs::{build_sim_app_for, SimTick};
/// let mut app = build_sim_app_for(&SimConfig::aggregation()).unwrap();
/// for _ in 0..1_000 {
///     app.world_mut().run_schedule(SimTick);
/// }
/// ```
pub fn build_sim_app_for(config: &SimConfig) -> Result<App, ConfigError> {
    build_sim_app_with_executor(config, ExecutorKind::SingleThreaded)
}

/// Build a headless Bevy app with a specific executor kind.
///
/// Phases are chained and every agent draws from its own RNG stream, so the
/// multi-threaded executor produces the same results as the single-threaded one.
pub fn build_sim_app_with_executor(
    config: &SimConfig,
    executor: ExecutorKind,
) -> Result<App, ConfigError> {
    config.validate()?;
    let index = SpatialIndex::new(config.proximity_radius)?;

    let mut app = App::empty();

    // Core resources
    app.insert_resource(SimClock::new());
    app.insert_resource(EcsSimConfig(config.clone()));
    app.insert_resource(SiteMap(config.build_sites()));
    app.insert_resource(AgentRegistry::new());
    app.insert_resource(EcsSpatialIndex(index));
    app.insert_resource(SimRng::new(config.seed));
    app.init_resource::<LifecycleRng>();
    app.init_resource::<LastCommit>();
    app.init_resource::<SnapshotLog>();

    // Build schedule with RNG distribution + applicator
    let mut schedule = configure_sim_schedule(executor);
    schedule.add_systems(distribute_rng.in_set(SimPhase::PreUpdate));
    schedule.add_systems(apply_lifecycle_mutations.in_set(SimPhase::PostUpdate));
    app.add_schedule(schedule);

    add_simulation_systems(&mut app);
    Ok(app)
}
