pub mod app;
pub mod clock;
pub mod commands;
pub mod components;
pub mod resources;
pub mod schedule;
pub mod spawn;
pub mod systems;
#[cfg(test)]
pub(crate) mod test_helpers;

pub use app::{build_sim_app_for, build_sim_app_with_executor};
pub use clock::SimClock;
pub use commands::{CommitReport, LastCommit, LifecycleMutation};
pub use components::{Agent, Behavior, Heading, Position};
pub use resources::{
    AgentRegistry, EcsSimConfig, EcsSpatialIndex, LifecycleRng, SimRng, SiteMap, SnapshotLog,
};
pub use schedule::{SimPhase, SimTick, configure_sim_schedule};
