use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Decision, Request, TickInput, ages_this_tick};
use crate::config::{PredatorParams, PredatorPreyModel};
use crate::model::Species;
use crate::stochastic::{bernoulli, gaussian_shaped_probability};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredatorState {
    pub age: u32,
    pub energy: f64,
    /// Updates lived so far; drives aging.
    pub ticks: u64,
    pub ticks_since_reproduction: u32,
}

impl PredatorState {
    pub fn newborn(params: &PredatorParams) -> Self {
        Self {
            age: 0,
            energy: params.start_energy,
            ticks: 0,
            ticks_since_reproduction: 0,
        }
    }
}

/// Catch probability against a single prey, given the predator's age.
pub fn hunt_chance(age: u32, params: &PredatorParams) -> f64 {
    params.fixed_hunt_chance.unwrap_or_else(|| {
        gaussian_shaped_probability(f64::from(age), f64::from(params.max_age), params.hunt_peak)
    })
}

/// Age, starve, hunt, breed, move. Death by age or starvation ends the update.
pub fn update<R: Rng + ?Sized>(
    state: &PredatorState,
    input: &TickInput<'_>,
    rng: &mut R,
) -> Decision<PredatorState> {
    if input.config.model == PredatorPreyModel::Simple {
        return update_simple(state, input, rng);
    }
    let params = &input.config.predator;
    let mut s = state.clone();
    let mut requests = Vec::new();

    s.ticks += 1;
    if ages_this_tick(s.ticks, input.config.ticks_per_age) {
        s.age += 1;
    }
    if s.age >= params.max_age {
        requests.push(Request::Kill(input.id));
        return Decision::stay(s, input, requests);
    }

    s.energy -= params.energy_decrease_per_step;
    if s.energy <= 0.0 {
        requests.push(Request::Kill(input.id));
        return Decision::stay(s, input, requests);
    }

    if s.energy < params.energy_to_hunt {
        let chance = hunt_chance(s.age, params);
        let prey = input
            .neighborhood
            .within(input.position, input.config.proximity_radius)
            .into_iter()
            .filter(|n| n.species == Species::Prey);
        for candidate in prey {
            if bernoulli(rng, chance) {
                requests.push(Request::Kill(candidate.id));
                s.energy = (s.energy + params.energy_gain_per_prey).min(params.max_energy);
                break;
            }
        }
    }

    s.ticks_since_reproduction += 1;
    if s.ticks_since_reproduction >= params.breeding_delay
        && s.energy >= params.repro_energy_threshold
        && s.age > 1
    {
        requests.push(Request::Reproduce(input.id));
        s.energy -= params.repro_energy_cost;
        s.ticks_since_reproduction = 0;
    }

    Decision {
        state: s,
        requests,
        heading: input.heading,
        position: input.step_from(input.position, input.heading),
    }
}

/// Simple model: eat the nearest prey in range and breed, or risk starving.
fn update_simple<R: Rng + ?Sized>(
    state: &PredatorState,
    input: &TickInput<'_>,
    rng: &mut R,
) -> Decision<PredatorState> {
    let mut s = state.clone();
    s.ticks += 1;

    let catch = input
        .neighborhood
        .within(input.position, input.config.proximity_radius)
        .into_iter()
        .find(|n| n.species == Species::Prey);
    let requests = match catch {
        Some(prey) => vec![Request::Kill(prey.id), Request::Reproduce(input.id)],
        None if bernoulli(rng, input.config.simple.predator_death_chance) => {
            return Decision::stay(s, input, vec![Request::Kill(input.id)]);
        }
        None => Vec::new(),
    };

    Decision {
        state: s,
        requests,
        heading: input.heading,
        position: input.step_from(input.position, input.heading),
    }
}
