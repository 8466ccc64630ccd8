//! Per-species state machines.
//!
//! Each species exposes a pure `update` that reads the agent's own state and a frozen
//! neighbourhood and returns a [`Decision`]: the next state, movement, and any lifecycle
//! requests. Nothing here touches the registry directly; requests are queued by the
//! caller and committed at the end of the tick.

pub mod aggregation;
pub mod predator;
pub mod prey;

use bevy_ecs::component::Component;
use rand::Rng;

use crate::config::SimConfig;
use crate::id::AgentId;
use crate::model::{Site, Species, Vec2};
use crate::spatial::Neighborhood;

pub use aggregation::{AggregationPhase, AggregationState};
pub use predator::PredatorState;
pub use prey::PreyState;

/// Everything an agent may look at while deciding its next step.
pub struct TickInput<'a> {
    pub id: AgentId,
    pub position: Vec2,
    pub heading: Vec2,
    pub neighborhood: &'a dyn Neighborhood,
    pub config: &'a SimConfig,
    pub sites: &'a [Site],
}

impl TickInput<'_> {
    /// Move along `direction` at the configured speed, wrapped into the world.
    pub(crate) fn step_from(&self, from: Vec2, direction: Vec2) -> Vec2 {
        self.config
            .world
            .wrap(from + direction * self.config.movement_speed)
    }
}

/// Lifecycle request emitted during an update. Applied at the end-of-tick commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Kill(AgentId),
    Reproduce(AgentId),
}

/// Result of one agent update.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision<S> {
    pub state: S,
    pub requests: Vec<Request>,
    pub heading: Vec2,
    /// Post-move position, already wrapped.
    pub position: Vec2,
}

impl<S> Decision<S> {
    /// Keep position and heading unchanged.
    pub(crate) fn stay(state: S, input: &TickInput<'_>, requests: Vec<Request>) -> Self {
        Self {
            state,
            requests,
            heading: input.heading,
            position: input.position,
        }
    }

    pub fn map_state<T>(self, f: impl FnOnce(S) -> T) -> Decision<T> {
        Decision {
            state: f(self.state),
            requests: self.requests,
            heading: self.heading,
            position: self.position,
        }
    }

    /// Whether this update asked for the agent's own removal.
    pub fn kills_self(&self, id: AgentId) -> bool {
        self.requests.contains(&Request::Kill(id))
    }
}

/// Species-specific agent state.
#[derive(Component, Debug, Clone, PartialEq)]
pub enum Behavior {
    Predator(PredatorState),
    Prey(PreyState),
    Aggregation(AggregationState),
}

impl Behavior {
    /// Fresh state for a newly spawned or newborn agent.
    pub fn newborn<R: Rng + ?Sized>(species: Species, config: &SimConfig, rng: &mut R) -> Self {
        match species {
            Species::Predator => Behavior::Predator(PredatorState::newborn(&config.predator)),
            Species::Prey => Behavior::Prey(PreyState::default()),
            Species::AggregationAgent => Behavior::Aggregation(AggregationState::new(rng)),
        }
    }

    pub fn species(&self) -> Species {
        match self {
            Behavior::Predator(_) => Species::Predator,
            Behavior::Prey(_) => Species::Prey,
            Behavior::Aggregation(_) => Species::AggregationAgent,
        }
    }

    pub fn age(&self) -> u32 {
        match self {
            Behavior::Predator(s) => s.age,
            Behavior::Prey(s) => s.age,
            Behavior::Aggregation(_) => 0,
        }
    }

    pub fn energy(&self) -> Option<f64> {
        match self {
            Behavior::Predator(s) => Some(s.energy),
            _ => None,
        }
    }

    /// Whether this is an aggregation agent in the still state.
    pub fn is_still(&self) -> bool {
        matches!(
            self,
            Behavior::Aggregation(AggregationState {
                phase: AggregationPhase::Still,
                ..
            })
        )
    }

    /// Short state label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Behavior::Predator(_) => "predator",
            Behavior::Prey(_) => "prey",
            Behavior::Aggregation(s) => s.phase.as_str(),
        }
    }

    /// Run one tick of the species update.
    pub fn step<R: Rng + ?Sized>(&self, input: &TickInput<'_>, rng: &mut R) -> Decision<Behavior> {
        match self {
            Behavior::Predator(s) => predator::update(s, input, rng).map_state(Behavior::Predator),
            Behavior::Prey(s) => prey::update(s, input, rng).map_state(Behavior::Prey),
            Behavior::Aggregation(s) => {
                aggregation::update(s, input, rng).map_state(Behavior::Aggregation)
            }
        }
    }
}

/// Whether `tick` is an aging tick for an agent that has lived `ticks` updates.
pub(crate) fn ages_this_tick(ticks: u64, ticks_per_age: u32) -> bool {
    ticks_per_age > 0 && ticks % u64::from(ticks_per_age) == 0
}
