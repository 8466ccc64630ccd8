use bevy_app::App;

use crate::ecs::clock::SimClock;
use crate::ecs::resources::SnapshotLog;
use crate::ecs::schedule::SimTick;
use crate::model::Snapshot;

/// Run `n` ticks of the simulation schedule.
pub fn tick_n(app: &mut App, n: u64) {
    for _ in 0..n {
        app.world_mut().run_schedule(SimTick);
    }
}

/// Return the number of the next tick to run.
pub fn current_tick(app: &App) -> u64 {
    app.world().resource::<SimClock>().tick_count
}

/// Take every snapshot recorded so far.
pub fn drain_snapshots(app: &mut App) -> Vec<Snapshot> {
    app.world_mut().resource_mut::<SnapshotLog>().drain()
}
