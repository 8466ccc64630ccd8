#![allow(dead_code)]

use swarm_sim::flush::MemorySink;
use swarm_sim::model::WorldBounds;
use swarm_sim::{SimConfig, Simulation, Snapshot};

/// 100 prey and 10 always-hungry predators that catch whatever they target, in a world
/// small enough for everyone to be in range of everyone else.
pub fn hunting_ground() -> SimConfig {
    let mut config = SimConfig::predator_prey();
    config.world = WorldBounds::new(100.0, 100.0);
    config.proximity_radius = 200.0;
    config.duration = 200;
    config.population.prey = 100;
    config.population.predators = 10;
    config.predator.fixed_hunt_chance = Some(1.0);
    config.predator.energy_to_hunt = 101.0;
    config.predator.energy_decrease_per_step = 5.0;
    config.predator.breeding_delay = 1_000_000;
    config.prey.max_breeding_chance = 0.0;
    config
}

/// Run `config` to completion and return every snapshot.
pub fn run_to_end(config: SimConfig) -> Vec<Snapshot> {
    let mut sim = Simulation::new(config).unwrap();
    let mut sink = MemorySink::new();
    sim.run(&mut sink).unwrap();
    sink.into_snapshots()
}

pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
