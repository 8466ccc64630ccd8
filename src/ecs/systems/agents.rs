//! Per-agent update (Update phase).
//!
//! Agents run in ascending id order against the spatial index frozen at the start of
//! the tick. Each agent draws from its own RNG stream, derived from the run seed, the
//! tick and its id. Lifecycle requests go to the `AgentRegistry` and only take effect
//! at the PostUpdate commit, but kills hide their target from later queries at once.

use bevy_app::App;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Query, Res, ResMut};

use crate::behavior::{Behavior, Request, TickInput};
use crate::ecs::clock::SimClock;
use crate::ecs::components::{Heading, Position};
use crate::ecs::resources::{AgentRegistry, EcsSimConfig, EcsSpatialIndex, SimRng, SiteMap};
use crate::ecs::schedule::{SimPhase, SimTick};
use crate::stochastic::agent_rng;

use super::spatial::LiveNeighborhood;

pub fn add_agent_systems(app: &mut App) {
    app.add_systems(SimTick, update_agents.in_set(SimPhase::Update));
}

pub fn update_agents(
    mut agents: Query<(&mut Behavior, &mut Position, &mut Heading)>,
    mut registry: ResMut<AgentRegistry>,
    index: Res<EcsSpatialIndex>,
    config: Res<EcsSimConfig>,
    sites: Res<SiteMap>,
    clock: Res<SimClock>,
    sim_rng: Res<SimRng>,
) {
    let order: Vec<_> = registry.iter().collect();
    for (id, entity) in order {
        if !registry.is_alive(id) {
            continue;
        }
        let Ok((mut behavior, mut position, mut heading)) = agents.get_mut(entity) else {
            continue;
        };

        let decision = {
            let neighborhood = LiveNeighborhood {
                index: &index.0,
                registry: &registry,
                exclude: id,
            };
            let input = TickInput {
                id,
                position: position.0,
                heading: heading.0,
                neighborhood: &neighborhood,
                config: &config.0,
                sites: &sites.0,
            };
            let mut rng = agent_rng(sim_rng.seed, clock.tick_count, id);
            behavior.step(&input, &mut rng)
        };

        *behavior = decision.state;
        position.0 = decision.position;
        heading.0 = decision.heading;
        for request in decision.requests {
            match request {
                Request::Kill(target) => {
                    registry.request_kill(target);
                }
                Request::Reproduce(parent) => {
                    registry.request_reproduce(parent);
                }
            }
        }
    }
}
