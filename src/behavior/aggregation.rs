//! Wander/join/still/leave state machine for site-seeking agents.
//!
//! States are evaluated in a fixed order within one update, so a transition taken by an
//! earlier state is carried on by the later one in the same tick (a wanderer that steps
//! onto a site starts joining immediately, a joiner that settles is already still).

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Decision, TickInput};
use crate::model::{Site, SiteId, Vec2, site_at};
use crate::stochastic::{compass_direction, leave_probability, reroll_interval};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPhase {
    #[default]
    Wander,
    Join,
    Still,
    Leave,
}

impl AggregationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationPhase::Wander => "wander",
            AggregationPhase::Join => "join",
            AggregationPhase::Still => "still",
            AggregationPhase::Leave => "leave",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationState {
    pub phase: AggregationPhase,
    /// Persistent compass direction used while wandering or leaving.
    pub direction: Vec2,
    /// Ticks since the last direction re-roll.
    pub ticks: u32,
    pub next_reroll: u32,
    /// Site being joined.
    pub site: Option<SiteId>,
}

impl AggregationState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            phase: AggregationPhase::Wander,
            direction: compass_direction(rng),
            ticks: 0,
            next_reroll: 0,
            site: None,
        }
    }
}

pub fn update<R: Rng + ?Sized>(
    state: &AggregationState,
    input: &TickInput<'_>,
    rng: &mut R,
) -> Decision<AggregationState> {
    let params = &input.config.aggregation;
    let radius = input.config.proximity_radius;
    let mut s = state.clone();
    let mut position = input.position;
    let mut heading = input.heading;

    if s.ticks >= s.next_reroll {
        s.ticks = 0;
        s.next_reroll = reroll_interval(rng, params.max_reroll_interval);
        s.direction = compass_direction(rng);
    }

    if s.phase == AggregationPhase::Wander {
        if let Some(site) = site_at(input.sites, position) {
            let crowd = input.neighborhood.within(position, radius).len();
            let join = 1.0 - leave_probability(crowd, params.leave_cutoff);
            if join > rng.random::<f64>() {
                s.phase = AggregationPhase::Join;
                s.site = Some(site.id);
            }
        }
        heading = s.direction;
        position = input.step_from(position, s.direction);
        s.ticks += 1;
    }

    if s.phase == AggregationPhase::Join {
        let nearest = input.neighborhood.nearest(position, params.nearest_neighbors);
        let mean = if nearest.is_empty() {
            params.isolated_mean_distance
        } else {
            nearest.iter().map(|n| n.distance).sum::<f64>() / nearest.len() as f64
        };
        let colliding = input
            .neighborhood
            .within(position, radius)
            .iter()
            .any(|n| n.distance < params.collision_threshold);
        let here = site_at(input.sites, position);

        match here {
            Some(site) if mean < params.closeness_threshold && !colliding => {
                s.phase = AggregationPhase::Still;
                s.site = Some(site.id);
                heading = Vec2::ZERO;
            }
            _ => {
                let target = s
                    .site
                    .and_then(|id| input.sites.iter().find(|site| site.id == id))
                    .or(here);
                let step = target.map_or(Vec2::ZERO, |site| {
                    steer_within(site, position, input.config.movement_speed, rng)
                });
                heading = step;
                position = input.step_from(position, step);
            }
        }
    }

    if s.phase == AggregationPhase::Still {
        heading = Vec2::ZERO;
        let crowd = input.neighborhood.within(position, radius).len();
        if leave_probability(crowd, params.leave_cutoff) > rng.random::<f64>() {
            s.phase = AggregationPhase::Leave;
            s.direction = compass_direction(rng);
            heading = s.direction;
        }
    }

    if s.phase == AggregationPhase::Leave {
        if site_at(input.sites, position).is_none() {
            s.phase = AggregationPhase::Wander;
            s.site = None;
        }
        heading = s.direction;
        position = input.step_from(position, s.direction);
    }

    Decision {
        state: s,
        requests: Vec::new(),
        heading,
        position,
    }
}

/// Direction that brings a joining agent back into `site`, or keeps it inside.
///
/// Outside the bounds, one of the axis directions pointing inwards is chosen. Inside,
/// a random compass step is taken only when it would not leave the site.
fn steer_within<R: Rng + ?Sized>(site: &Site, position: Vec2, speed: f64, rng: &mut R) -> Vec2 {
    let inward = site.inward_directions(position);
    if !inward.is_empty() {
        return inward[rng.random_range(0..inward.len())];
    }
    let step = compass_direction(rng);
    if site.contains(position + step * speed) {
        step
    } else {
        Vec2::ZERO
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::behavior::test_support::{index_of, input};
    use crate::config::SimConfig;
    use crate::model::Species;

    fn config() -> SimConfig {
        SimConfig::aggregation()
    }

    fn state(phase: AggregationPhase) -> AggregationState {
        AggregationState {
            phase,
            direction: Vec2::new(1.0, 0.0),
            ticks: 0,
            next_reroll: 1_000,
            site: Some(SiteId(0)),
        }
    }

    fn agents_at(points: &[(f64, f64)]) -> Vec<(u64, Species, Vec2)> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (i as u64 + 10, Species::AggregationAgent, Vec2::new(x, y)))
            .collect()
    }

    #[test]
    fn wanderer_off_site_keeps_walking() {
        let config = config();
        let sites = config.build_sites();
        let index = index_of(&[]);
        let tick_input = input(&index, &config, &sites, Vec2::new(20.0, 20.0), Vec2::ZERO);
        let mut rng = SmallRng::seed_from_u64(4);
        let d = update(&state(AggregationPhase::Wander), &tick_input, &mut rng);
        assert_eq!(d.state.phase, AggregationPhase::Wander);
        assert_eq!(d.position, Vec2::new(24.0, 20.0));
        assert_eq!(d.heading, Vec2::new(1.0, 0.0));
        assert_eq!(d.state.ticks, 1);
    }

    #[test]
    fn wanderer_on_site_joins_and_steers_same_tick() {
        let config = config();
        let sites = config.build_sites();
        let index = index_of(&[]);
        let tick_input = input(&index, &config, &sites, Vec2::new(200.0, 200.0), Vec2::ZERO);
        let mut rng = SmallRng::seed_from_u64(4);
        let mut wanderer = state(AggregationPhase::Wander);
        wanderer.site = None;
        let d = update(&wanderer, &tick_input, &mut rng);
        // Alone, so the mean distance is the isolated default and it keeps joining.
        assert_eq!(d.state.phase, AggregationPhase::Join);
        assert_eq!(d.state.site, Some(SiteId(0)));
        assert!(sites[0].contains(d.position));
    }

    #[test]
    fn joiner_settles_near_a_cluster() {
        let config = config();
        let sites = config.build_sites();
        let others = agents_at(&[
            (215.0, 200.0),
            (185.0, 200.0),
            (200.0, 215.0),
            (200.0, 185.0),
            (215.0, 215.0),
        ]);
        let index = index_of(&others);
        let here = Vec2::new(200.0, 200.0);
        let tick_input = input(&index, &config, &sites, here, Vec2::new(1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(4);
        let d = update(&state(AggregationPhase::Join), &tick_input, &mut rng);
        assert_eq!(d.state.phase, AggregationPhase::Still);
        assert_eq!(d.heading, Vec2::ZERO);
        assert_eq!(d.position, here);
    }

    #[test]
    fn joiner_does_not_settle_on_top_of_another_agent() {
        let config = config();
        let sites = config.build_sites();
        let others = agents_at(&[
            (210.0, 200.0),
            (185.0, 200.0),
            (200.0, 215.0),
            (200.0, 185.0),
            (215.0, 215.0),
        ]);
        let index = index_of(&others);
        let tick_input = input(&index, &config, &sites, Vec2::new(200.0, 200.0), Vec2::ZERO);
        let mut rng = SmallRng::seed_from_u64(4);
        let d = update(&state(AggregationPhase::Join), &tick_input, &mut rng);
        assert_eq!(d.state.phase, AggregationPhase::Join);
        assert!(sites[0].contains(d.position));
    }

    #[test]
    fn joiner_outside_site_steps_back_inwards() {
        let config = config();
        let sites = config.build_sites();
        let index = index_of(&[]);
        let tick_input = input(&index, &config, &sites, Vec2::new(90.0, 200.0), Vec2::ZERO);
        let mut rng = SmallRng::seed_from_u64(4);
        let d = update(&state(AggregationPhase::Join), &tick_input, &mut rng);
        assert_eq!(d.state.phase, AggregationPhase::Join);
        assert_eq!(d.position, Vec2::new(94.0, 200.0));
    }

    #[test]
    fn joiner_never_steps_out_of_site() {
        let config = config();
        let sites = config.build_sites();
        let index = index_of(&[]);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut position = Vec2::new(101.0, 101.0);
        let mut s = state(AggregationPhase::Join);
        for _ in 0..500 {
            let tick_input = input(&index, &config, &sites, position, Vec2::ZERO);
            let d = update(&s, &tick_input, &mut rng);
            assert!(sites[0].contains(d.position), "left site at {:?}", d.position);
            position = d.position;
            s = d.state;
        }
    }

    #[test]
    fn small_clusters_never_release_still_agents() {
        let config = config();
        let sites = config.build_sites();
        let others = agents_at(&[(210.0, 200.0), (190.0, 200.0), (200.0, 215.0)]);
        let index = index_of(&others);
        let tick_input = input(&index, &config, &sites, Vec2::new(200.0, 200.0), Vec2::ZERO);
        let mut rng = SmallRng::seed_from_u64(4);
        let mut s = state(AggregationPhase::Still);
        for _ in 0..200 {
            let d = update(&s, &tick_input, &mut rng);
            assert_eq!(d.state.phase, AggregationPhase::Still);
            assert_eq!(d.position, Vec2::new(200.0, 200.0));
            s = d.state;
        }
    }

    #[test]
    fn leaver_turns_wanderer_once_off_site() {
        let config = config();
        let sites = config.build_sites();
        let index = index_of(&[]);
        let mut rng = SmallRng::seed_from_u64(4);

        let on_site = input(&index, &config, &sites, Vec2::new(298.0, 200.0), Vec2::ZERO);
        let d = update(&state(AggregationPhase::Leave), &on_site, &mut rng);
        assert_eq!(d.state.phase, AggregationPhase::Leave);
        assert_eq!(d.position, Vec2::new(302.0, 200.0));

        let off_site = input(&index, &config, &sites, d.position, d.heading);
        let d = update(&d.state, &off_site, &mut rng);
        assert_eq!(d.state.phase, AggregationPhase::Wander);
        assert_eq!(d.state.site, None);
        assert_eq!(d.position, Vec2::new(306.0, 200.0));
    }

    #[test]
    fn direction_is_rerolled_when_interval_expires() {
        let config = config();
        let sites = config.build_sites();
        let index = index_of(&[]);
        let tick_input = input(&index, &config, &sites, Vec2::new(20.0, 20.0), Vec2::ZERO);
        let mut rng = SmallRng::seed_from_u64(4);
        let mut s = state(AggregationPhase::Wander);
        s.next_reroll = 0;
        let d = update(&s, &tick_input, &mut rng);
        assert!((1..=config.aggregation.max_reroll_interval).contains(&d.state.next_reroll));
        assert_eq!(d.state.ticks, 1);
        assert_eq!(d.heading, d.state.direction);
    }
}
