pub mod runner;

pub use runner::{AgentView, RunSummary, Simulation, StopHandle, run_batch};
