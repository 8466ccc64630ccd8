//! Probability curves and random draws shared by the species behaviours.
//!
//! Every draw goes through an RNG handed in by the caller. The tick runner hands each
//! agent its own stream (see [`agent_rng`]), so results depend only on the run seed,
//! the tick and the agent id, never on evaluation order.

use std::f64::consts::TAU;
use std::hash::{DefaultHasher, Hash, Hasher};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::id::AgentId;
use crate::model::Vec2;

/// The eight compass moves N, NE, E, SE, S, SW, W, NW (screen coordinates, y down).
/// Diagonals are not normalised.
pub const COMPASS: [Vec2; 8] = [
    Vec2::new(0.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(-1.0, -1.0),
];

/// Bernoulli trial. Certain outcomes (`p <= 0`, `p >= 1`) consume no draw.
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    if p.is_nan() || p <= 0.0 {
        return false;
    }
    if p >= 1.0 {
        return true;
    }
    rng.random::<f64>() < p
}

/// Bell-shaped probability over an agent's life: `peak_scale` at `max_age / 2`,
/// exactly 0 at birth and at `max_age`, 0 outside `[0, max_age]`.
///
/// The normal curve uses σ = `max_age / 4` and is shifted down by its value at the
/// boundaries before being rescaled, so the peak is exactly `peak_scale`.
pub fn gaussian_shaped_probability(age: f64, max_age: f64, peak_scale: f64) -> f64 {
    if !(max_age > 0.0) || !(0.0..=max_age).contains(&age) {
        return 0.0;
    }
    let mean = max_age / 2.0;
    let std_dev = max_age / 4.0;
    let bell = |x: f64| (-((x - mean).powi(2)) / (2.0 * std_dev * std_dev)).exp();
    let baseline = bell(0.0);
    ((bell(age) - baseline) / (1.0 - baseline)).max(0.0) * peak_scale
}

pub fn compass_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    COMPASS[rng.random_range(0..COMPASS.len())]
}

/// Unit vector at a uniformly drawn angle.
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.random::<f64>() * TAU;
    Vec2::new(angle.cos(), angle.sin())
}

/// Ticks until the next direction re-roll, uniform in `1..=max_interval`.
pub fn reroll_interval<R: Rng + ?Sized>(rng: &mut R, max_interval: u32) -> u32 {
    rng.random_range(1..=max_interval.max(1))
}

/// Probability that a still agent leaves its cluster, given `n` live neighbours
/// in proximity. Raw values above `cutoff` are discarded (0), so only large
/// clusters ever see a non-zero leave probability.
pub fn leave_probability(neighbors: usize, cutoff: f64) -> f64 {
    let raw = if neighbors == 0 {
        1.0
    } else {
        1.0 / neighbors as f64
    };
    if raw > cutoff { 0.0 } else { raw }
}

/// Derive a deterministic seed for one RNG stream of one tick.
pub fn derive_seed(seed: u64, domain: &str, tick: u64, stream: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    domain.hash(&mut hasher);
    tick.hash(&mut hasher);
    stream.hash(&mut hasher);
    hasher.finish()
}

/// The private RNG stream of one agent for one tick.
pub fn agent_rng(seed: u64, tick: u64, id: AgentId) -> SmallRng {
    SmallRng::seed_from_u64(derive_seed(seed, "agent", tick, id.get()))
}
