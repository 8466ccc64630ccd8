mod common;

use swarm_sim::flush::{MemorySink, NullSink, StreakWatch, find_full_aggregation};
use swarm_sim::{SimConfig, Simulation, SiteId, Species};

const STREAK: u64 = 100;

fn bounded(seed: u64) -> SimConfig {
    let mut config = SimConfig::aggregation().with_seed(seed);
    config.duration = 20_000;
    config
}

/// Tick at which all 50 agents first sat still on the site for `STREAK` ticks.
fn full_aggregation_tick(seed: u64) -> Option<u64> {
    let mut sim = Simulation::new(bounded(seed)).unwrap();
    let mut watch = StreakWatch::new(50, STREAK);
    let mut found = None;
    sim.run_until(&mut NullSink, |snapshot| {
        found = watch.observe_site(snapshot, SiteId(0));
        found.is_some()
    })
    .unwrap();
    found
}

#[test]
fn fifty_agents_fully_aggregate_reproducibly() {
    let first = full_aggregation_tick(7);
    assert!(first.is_some(), "site never filled within 20000 ticks");
    assert_eq!(first, full_aggregation_tick(7));
}

#[test]
fn streak_scan_agrees_with_early_stop() {
    let mut sim = Simulation::new(bounded(7)).unwrap();
    let mut sink = MemorySink::new();
    let mut watch = StreakWatch::new(50, STREAK);
    sim.run_until(&mut sink, |s| watch.observe_site(s, SiteId(0)).is_some())
        .unwrap();

    let snapshots = sink.into_snapshots();
    assert_eq!(
        find_full_aggregation(&snapshots, SiteId(0), 50, STREAK),
        full_aggregation_tick(7)
    );
}

#[test]
fn still_agents_are_always_on_site() {
    let mut config = bounded(3);
    config.duration = 2_000;
    for snapshot in common::run_to_end(config) {
        let site = snapshot.site(SiteId(0));
        assert!(site.still <= site.on_site, "tick {}", snapshot.tick);
        assert_eq!(snapshot.count(Species::AggregationAgent), 50);
        assert_eq!(snapshot.births + snapshot.deaths, 0);
    }
}

#[test]
fn still_agents_do_not_move() {
    let mut config = bounded(11);
    config.duration = 0;
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..1_500 {
        sim.tick();
    }
    let before: Vec<_> = sim
        .agents()
        .into_iter()
        .filter(|a| a.state == "still")
        .collect();
    sim.tick();
    let after = sim.agents();
    for agent in &before {
        let now = after.iter().find(|a| a.id == agent.id).unwrap();
        if now.state == "still" {
            assert_eq!(now.position, agent.position);
            assert_eq!(now.heading, swarm_sim::Vec2::ZERO);
        }
    }
}
