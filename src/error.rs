use thiserror::Error;

/// Invalid start-up configuration. Detected before the first tick; the run does not start.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("world dimensions must be positive (got {width} x {height})")]
    WorldSize { width: f64, height: f64 },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a probability in [0, 1] (got {value})")]
    Probability { field: &'static str, value: f64 },

    #[error("{field} must be non-zero")]
    Zero { field: &'static str },

    #[error("population is empty: at least one agent must be spawned")]
    EmptyPopulation,

    #[error("site {index} is degenerate or lies outside the world")]
    Site { index: usize },
}

/// Errors surfaced by a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("snapshot sink I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
