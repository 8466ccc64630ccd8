pub mod registry;
pub mod sim_resources;

pub use registry::AgentRegistry;
pub use sim_resources::{
    EcsSimConfig, EcsSpatialIndex, LifecycleRng, SimRng, SiteMap, SnapshotLog, distribute_rng,
};
