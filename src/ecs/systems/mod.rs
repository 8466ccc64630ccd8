pub mod agents;
pub mod snapshot;
pub mod spatial;

use bevy_app::App;

pub use agents::add_agent_systems;
pub use snapshot::add_snapshot_systems;
pub use spatial::{LiveNeighborhood, add_spatial_systems};

/// Register every per-tick simulation system on the `SimTick` schedule.
pub fn add_simulation_systems(app: &mut App) {
    add_spatial_systems(app);
    add_agent_systems(app);
    add_snapshot_systems(app);
}
