use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Decision, Request, TickInput, ages_this_tick};
use crate::config::{PredatorPreyModel, PreyParams};
use crate::stochastic::{bernoulli, gaussian_shaped_probability};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreyState {
    pub age: u32,
    pub ticks: u64,
    pub ticks_since_reproduction: u32,
}

pub fn breeding_chance(age: u32, params: &PreyParams) -> f64 {
    gaussian_shaped_probability(
        f64::from(age),
        f64::from(params.max_age),
        params.max_breeding_chance,
    )
}

/// Age, maybe breed, move. Death by age ends the update.
pub fn update<R: Rng + ?Sized>(
    state: &PreyState,
    input: &TickInput<'_>,
    rng: &mut R,
) -> Decision<PreyState> {
    let params = &input.config.prey;
    let mut s = state.clone();
    let mut requests = Vec::new();

    s.ticks += 1;
    if input.config.model == PredatorPreyModel::Simple {
        // Fixed breeding rate; no aging, no delay.
        if bernoulli(rng, input.config.simple.prey_reproduction_chance) {
            requests.push(Request::Reproduce(input.id));
        }
        return Decision {
            state: s,
            requests,
            heading: input.heading,
            position: input.step_from(input.position, input.heading),
        };
    }
    if ages_this_tick(s.ticks, input.config.ticks_per_age) {
        s.age += 1;
    }
    if s.age >= params.max_age {
        requests.push(Request::Kill(input.id));
        return Decision::stay(s, input, requests);
    }

    s.ticks_since_reproduction += 1;
    if s.ticks_since_reproduction >= params.breeding_delay
        && bernoulli(rng, breeding_chance(s.age, params))
    {
        requests.push(Request::Reproduce(input.id));
        s.ticks_since_reproduction = 0;
    }

    Decision {
        state: s,
        requests,
        heading: input.heading,
        position: input.step_from(input.position, input.heading),
    }
}
