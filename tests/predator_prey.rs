mod common;

use common::{hunting_ground, run_to_end};
use swarm_sim::config::PredatorPreyModel;
use swarm_sim::flush::SeriesCollector;
use swarm_sim::model::WorldBounds;
use swarm_sim::{SimConfig, Species, run_batch};

#[test]
fn prey_strictly_decrease_until_exhausted() {
    let snapshots = run_to_end(hunting_ground());

    let mut previous = 100;
    let mut exhausted_at = None;
    for snapshot in &snapshots {
        let prey = snapshot.count(Species::Prey);
        if previous == 0 {
            assert_eq!(prey, 0, "prey reappeared at tick {}", snapshot.tick);
            continue;
        }
        assert!(
            prey < previous,
            "prey did not decrease at tick {}: {previous} -> {prey}",
            snapshot.tick
        );
        if prey == 0 {
            exhausted_at = Some(snapshot.tick);
        }
        previous = prey;
    }
    let exhausted_at = exhausted_at.expect("prey never ran out");
    // Ten predators catch at least one prey between them every tick.
    assert!(exhausted_at < 100);
}

#[test]
fn predators_starve_after_prey_run_out() {
    let config = hunting_ground();
    let grace = (config.predator.start_energy / config.predator.energy_decrease_per_step) as u64;
    let snapshots = run_to_end(config);

    let exhausted_at = snapshots
        .iter()
        .find(|s| s.count(Species::Prey) == 0)
        .map(|s| s.tick)
        .expect("prey never ran out");
    let starved_at = snapshots
        .iter()
        .find(|s| s.count(Species::Predator) == 0)
        .map(|s| s.tick)
        .expect("predators never died out");

    assert!(starved_at > exhausted_at);
    assert!(
        starved_at <= exhausted_at + grace,
        "predators outlived their energy: prey gone at {exhausted_at}, predators at {starved_at}"
    );
    assert!(snapshots.last().is_some_and(|s| s.total() == 0));
}

#[test]
fn well_fed_predators_keep_full_energy() {
    let mut config = hunting_ground();
    config.duration = 3;
    config.record_agent_annotations = true;
    let snapshots = run_to_end(config);

    let annotations = snapshots[2].agents.as_ref().unwrap();
    let energies: Vec<f64> = annotations
        .iter()
        .filter(|a| a.species == Species::Predator)
        .filter_map(|a| a.energy)
        .collect();
    assert_eq!(energies.len(), 10);
    assert!(energies.iter().all(|e| *e == 100.0));
}

#[test]
fn population_changes_match_births_and_deaths() {
    let mut config = SimConfig::predator_prey();
    config.world = WorldBounds::new(250.0, 250.0);
    config.population.prey = 300;
    config.population.predators = 8;
    config.prey.max_breeding_chance = 0.05;
    config.duration = 400;
    let initial = config.population.total() as i64;
    let snapshots = run_to_end(config);

    let mut total = initial;
    for snapshot in &snapshots {
        total += i64::from(snapshot.births) - i64::from(snapshot.deaths);
        assert_eq!(total, i64::from(snapshot.total()), "tick {}", snapshot.tick);
    }
    assert!(snapshots.iter().any(|s| s.births > 0));
}

fn simple_hunting_ground() -> SimConfig {
    let mut config = hunting_ground();
    config.model = PredatorPreyModel::Simple;
    config.simple.predator_death_chance = 0.0;
    config.simple.prey_reproduction_chance = 0.0;
    config
}

#[test]
fn simple_model_turns_every_catch_into_a_predator() {
    let snapshots = run_to_end(simple_hunting_ground());

    for snapshot in &snapshots {
        assert_eq!(snapshot.total(), 110, "tick {}", snapshot.tick);
        assert_eq!(snapshot.births, snapshot.deaths, "tick {}", snapshot.tick);
    }
    let last = snapshots.last().unwrap();
    assert_eq!(last.count(Species::Prey), 0);
    assert_eq!(last.count(Species::Predator), 110);
}

#[test]
fn simple_model_predators_without_prey_starve() {
    let mut config = simple_hunting_ground();
    config.population.prey = 0;
    config.simple.predator_death_chance = 1.0;
    config.duration = 3;
    let snapshots = run_to_end(config);
    assert_eq!(snapshots[0].count(Species::Predator), 0);
    assert_eq!(snapshots[0].deaths, 10);
}

#[test]
fn simple_model_batch_records_every_run() {
    let mut config = SimConfig::predator_prey_simple();
    config.world = WorldBounds::new(200.0, 200.0);
    config.population.prey = 150;
    config.population.predators = 5;
    config.duration = 50;
    let mut collector = SeriesCollector::new();
    run_batch(&config, 3, &mut collector).unwrap();

    assert_eq!(collector.runs().len(), 3);
    for ticks in collector.runs().values() {
        assert_eq!(ticks.len(), 50);
        assert!(ticks.values().all(|c| c.contains_key("predator") && c.contains_key("prey")));
    }
    assert_ne!(collector.run(1), collector.run(2));
}
