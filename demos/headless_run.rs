use swarm_sim::flush::{MemorySink, NullSink, SeriesCollector, StreakWatch};
use swarm_sim::{SimConfig, SimError, Simulation, SiteId, Species, run_batch};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Predator/prey at default scale
    let mut config = SimConfig::predator_prey().with_seed(42);
    config.duration = 2_000;
    let mut sim = Simulation::new(config)?;
    let mut sink = MemorySink::new();
    let summary = sim.run(&mut sink)?;
    for snapshot in sink.snapshots.iter().step_by(200) {
        eprintln!(
            "tick {:>5}: predators={:>4} prey={:>5} births={:>3} deaths={:>3}",
            snapshot.tick,
            snapshot.count(Species::Predator),
            snapshot.count(Species::Prey),
            snapshot.births,
            snapshot.deaths,
        );
    }
    eprintln!("final counts after {} ticks: {:?}", summary.ticks_run, summary.final_counts);

    // Simple model, a few short runs
    let mut config = SimConfig::predator_prey_simple();
    config.duration = 500;
    let mut series = SeriesCollector::new();
    run_batch(&config, 3, &mut series)?;
    for (run, ticks) in series.runs() {
        if let Some((tick, counts)) = ticks.last_key_value() {
            eprintln!("simple run {run}, tick {tick}: {counts:?}");
        }
    }

    // Aggregation until the site holds everyone for 500 ticks
    let mut config = SimConfig::aggregation().with_seed(42);
    config.duration = 20_000;
    let capacity = config.population.aggregation_agents;
    let mut sim = Simulation::new(config)?;
    let mut watch = StreakWatch::new(capacity, 500);
    let mut aggregated_at = None;
    let summary = sim.run_until(&mut NullSink, |snapshot| {
        aggregated_at = watch.observe_site(snapshot, SiteId(0));
        aggregated_at.is_some()
    })?;
    match aggregated_at {
        Some(tick) => eprintln!("fully aggregated from tick {tick}"),
        None => eprintln!("not aggregated after {} ticks", summary.ticks_run),
    }
    let still = sim.agents().iter().filter(|a| a.state == "still").count();
    eprintln!("still agents: {still}/{capacity}");
    Ok(())
}
