pub mod behavior;
pub mod config;
pub mod ecs;
pub mod error;
pub mod flush;
pub mod id;
pub mod model;
pub mod sim;
pub mod spatial;
pub mod stochastic;

pub use config::{PredatorPreyModel, SimConfig};
pub use error::{ConfigError, SimError};
pub use id::{AgentId, IdGenerator};
pub use model::{Site, SiteCount, SiteId, Snapshot, Species, Vec2, WorldBounds};
pub use sim::{AgentView, RunSummary, Simulation, StopHandle, run_batch};
