use bevy_ecs::resource::Resource;
use bevy_ecs::system::ResMut;

/// Simulation clock resource tracking the current tick.
///
/// The `advance_clock` system moves the clock forward at the end of each tick (in
/// `SimPhase::Last`), so every other system, including the snapshot recorder, sees
/// the number of the tick being processed.
#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    pub tick_count: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick.
    pub fn advance(&mut self) {
        self.tick_count += 1;
    }
}

/// Bevy system that advances the simulation clock by one tick.
/// Registered in `SimPhase::Last` so all other systems see the current
/// tick before it advances.
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}
