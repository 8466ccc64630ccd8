use std::fmt;

use serde::{Deserialize, Serialize};

/// Species tag of an agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Predator,
    Prey,
    AggregationAgent,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Predator, Species::Prey, Species::AggregationAgent];

    pub fn as_str(self) -> &'static str {
        match self {
            Species::Predator => "predator",
            Species::Prey => "prey",
            Species::AggregationAgent => "aggregation_agent",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
