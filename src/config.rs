use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Site, SiteId, Vec2, WorldBounds};

/// Initial population per species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub predators: u32,
    pub prey: u32,
    pub aggregation_agents: u32,
}

impl PopulationConfig {
    pub fn total(&self) -> u64 {
        u64::from(self.predators) + u64::from(self.prey) + u64::from(self.aggregation_agents)
    }
}

/// Rule set followed by predators and prey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredatorPreyModel {
    /// Catch-and-breed predators with a starvation chance; prey breed at a fixed rate.
    /// Nobody ages and there is no energy.
    Simple,
    /// Energy, age curves and breeding delays.
    #[default]
    Extended,
}

/// Per-tick chances of the simple model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleModelParams {
    /// Chance that a predator which caught nothing this tick dies.
    pub predator_death_chance: f64,
    pub prey_reproduction_chance: f64,
}

impl Default for SimpleModelParams {
    fn default() -> Self {
        Self {
            predator_death_chance: 0.05,
            prey_reproduction_chance: 0.005,
        }
    }
}

/// Predator energy, aging, hunting and breeding thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredatorParams {
    pub start_energy: f64,
    /// Energy is capped here after a successful hunt.
    pub max_energy: f64,
    pub energy_decrease_per_step: f64,
    /// Predators only hunt while their energy is below this value.
    pub energy_to_hunt: f64,
    pub energy_gain_per_prey: f64,
    pub max_age: u32,
    /// Peak of the age-dependent hunt success curve.
    pub hunt_peak: f64,
    /// Replaces the age curve with a constant success probability when set.
    pub fixed_hunt_chance: Option<f64>,
    pub breeding_delay: u32,
    pub repro_energy_threshold: f64,
    pub repro_energy_cost: f64,
}

impl Default for PredatorParams {
    fn default() -> Self {
        Self {
            start_energy: 100.0,
            max_energy: 100.0,
            energy_decrease_per_step: 1.0,
            energy_to_hunt: 75.0,
            energy_gain_per_prey: 30.0,
            max_age: 12,
            hunt_peak: 1.0,
            fixed_hunt_chance: None,
            breeding_delay: 60,
            repro_energy_threshold: 30.0,
            repro_energy_cost: 0.0,
        }
    }
}

/// Prey aging and breeding thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreyParams {
    pub max_age: u32,
    /// Peak of the age-dependent breeding curve.
    pub max_breeding_chance: f64,
    pub breeding_delay: u32,
}

impl Default for PreyParams {
    fn default() -> Self {
        Self {
            max_age: 9,
            max_breeding_chance: 0.005,
            breeding_delay: 10,
        }
    }
}

/// Join/still/leave thresholds of the aggregation state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationParams {
    /// Neighbours closer than this count as a collision.
    pub collision_threshold: f64,
    /// Mean nearest-neighbour distance below which a joining agent settles.
    pub closeness_threshold: f64,
    pub nearest_neighbors: usize,
    /// Mean distance assumed when an agent has no neighbours at all.
    pub isolated_mean_distance: f64,
    /// Leave probabilities above this value are discarded (set to 0).
    pub leave_cutoff: f64,
    /// Upper bound of the randomized direction re-roll interval, in ticks.
    pub max_reroll_interval: u32,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            collision_threshold: 14.0,
            closeness_threshold: 30.0,
            nearest_neighbors: 5,
            isolated_mean_distance: 100.0,
            leave_cutoff: 0.1,
            max_reroll_interval: 150,
        }
    }
}

/// Static description of an aggregation site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Start-up configuration of a run. Immutable once the simulation is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub world: WorldBounds,
    /// Number of ticks to run; 0 runs until stopped externally.
    pub duration: u64,
    pub movement_speed: f64,
    pub proximity_radius: f64,
    /// Agents age by one year every this many of their own ticks.
    pub ticks_per_age: u32,
    pub population: PopulationConfig,
    pub model: PredatorPreyModel,
    pub simple: SimpleModelParams,
    pub predator: PredatorParams,
    pub prey: PreyParams,
    pub aggregation: AggregationParams,
    pub sites: Vec<SiteConfig>,
    /// Attach per-agent age/energy annotations to every snapshot.
    pub record_agent_annotations: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::predator_prey()
    }
}

impl SimConfig {
    /// Extended predator/prey model.
    pub fn predator_prey() -> Self {
        Self {
            seed: 1,
            world: WorldBounds::new(800.0, 800.0),
            duration: 20_000,
            movement_speed: 0.8,
            proximity_radius: 20.0,
            ticks_per_age: 60,
            population: PopulationConfig {
                predators: 25,
                prey: 2000,
                aggregation_agents: 0,
            },
            model: PredatorPreyModel::Extended,
            simple: SimpleModelParams::default(),
            predator: PredatorParams::default(),
            prey: PreyParams::default(),
            aggregation: AggregationParams::default(),
            sites: Vec::new(),
            record_agent_annotations: false,
        }
    }

    /// Simple predator/prey model: predators breed on every catch and may starve on
    /// ticks without one, prey breed at a fixed rate.
    pub fn predator_prey_simple() -> Self {
        Self {
            world: WorldBounds::new(800.0, 800.0),
            duration: 4_000,
            proximity_radius: 25.0,
            model: PredatorPreyModel::Simple,
            ..Self::predator_prey()
        }
    }

    /// Single aggregation site sized for 50 agents.
    pub fn aggregation() -> Self {
        Self {
            seed: 1,
            world: WorldBounds::new(400.0, 400.0),
            duration: 0,
            movement_speed: 4.0,
            proximity_radius: 20.0,
            ticks_per_age: 60,
            population: PopulationConfig {
                predators: 0,
                prey: 0,
                aggregation_agents: 50,
            },
            model: PredatorPreyModel::Extended,
            simple: SimpleModelParams::default(),
            predator: PredatorParams::default(),
            prey: PreyParams::default(),
            aggregation: AggregationParams::default(),
            sites: vec![SiteConfig {
                center_x: 200.0,
                center_y: 200.0,
                width: 200.0,
                height: 200.0,
            }],
            record_agent_annotations: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the immutable site list in configuration order.
    pub fn build_sites(&self) -> Vec<Site> {
        self.sites
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Site::new(
                    SiteId(i as u32),
                    Vec2::new(s.center_x, s.center_y),
                    s.width,
                    s.height,
                )
            })
            .collect()
    }

    /// Check every threshold before the first tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world.width > 0.0 && self.world.height > 0.0) {
            return Err(ConfigError::WorldSize {
                width: self.world.width,
                height: self.world.height,
            });
        }
        positive("proximity_radius", self.proximity_radius)?;
        non_negative("movement_speed", self.movement_speed)?;
        if self.ticks_per_age == 0 {
            return Err(ConfigError::Zero {
                field: "ticks_per_age",
            });
        }
        if self.population.total() == 0 {
            return Err(ConfigError::EmptyPopulation);
        }

        let predator = &self.predator;
        positive("predator.start_energy", predator.start_energy)?;
        positive("predator.max_energy", predator.max_energy)?;
        non_negative(
            "predator.energy_decrease_per_step",
            predator.energy_decrease_per_step,
        )?;
        non_negative("predator.energy_gain_per_prey", predator.energy_gain_per_prey)?;
        non_negative("predator.repro_energy_cost", predator.repro_energy_cost)?;
        positive("predator.max_age", f64::from(predator.max_age))?;
        probability("predator.hunt_peak", predator.hunt_peak)?;
        if let Some(chance) = predator.fixed_hunt_chance {
            probability("predator.fixed_hunt_chance", chance)?;
        }

        probability(
            "simple.predator_death_chance",
            self.simple.predator_death_chance,
        )?;
        probability(
            "simple.prey_reproduction_chance",
            self.simple.prey_reproduction_chance,
        )?;

        positive("prey.max_age", f64::from(self.prey.max_age))?;
        probability("prey.max_breeding_chance", self.prey.max_breeding_chance)?;

        let aggregation = &self.aggregation;
        non_negative("aggregation.collision_threshold", aggregation.collision_threshold)?;
        positive("aggregation.closeness_threshold", aggregation.closeness_threshold)?;
        non_negative(
            "aggregation.isolated_mean_distance",
            aggregation.isolated_mean_distance,
        )?;
        probability("aggregation.leave_cutoff", aggregation.leave_cutoff)?;
        if aggregation.nearest_neighbors == 0 {
            return Err(ConfigError::Zero {
                field: "aggregation.nearest_neighbors",
            });
        }
        if aggregation.max_reroll_interval == 0 {
            return Err(ConfigError::Zero {
                field: "aggregation.max_reroll_interval",
            });
        }

        for (index, site) in self.build_sites().iter().enumerate() {
            let inside = site.left() >= 0.0
                && site.top() >= 0.0
                && site.right() <= self.world.width
                && site.bottom() <= self.world.height;
            if !(site.width > 0.0 && site.height > 0.0) || !inside {
                return Err(ConfigError::Site { index });
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { field, value })
    }
}
