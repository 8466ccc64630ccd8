use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;
use rand::Rng;

use crate::behavior::Behavior;
use crate::ecs::components::{Agent, Heading, Position};
use crate::ecs::resources::{AgentRegistry, EcsSimConfig, SimRng};
use crate::id::AgentId;
use crate::model::{Species, Vec2};
use crate::stochastic::random_heading;

fn register(world: &mut World, id: AgentId, entity: Entity) {
    // Graceful when AgentRegistry is temporarily removed from the world
    // (e.g. during apply_lifecycle_mutations, which extracts it into ApplyCtx).
    // In that case the applicator registers the entity itself.
    if let Some(mut registry) = world.get_resource_mut::<AgentRegistry>() {
        registry.register(id, entity);
    }
}

/// Spawn the ECS entity for an agent whose id is already allocated.
pub fn spawn_agent(
    world: &mut World,
    id: AgentId,
    state: Behavior,
    position: Vec2,
    heading: Vec2,
) -> Entity {
    let entity = world
        .spawn((
            Agent {
                id,
                species: state.species(),
            },
            Position(position),
            Heading(heading),
            state,
        ))
        .id();
    register(world, id, entity);
    entity
}

/// Spawn the configured starting population at uniformly random positions:
/// prey first, then predators, then aggregation agents, with consecutive ids.
///
/// Uses `SimRng`, so placement depends only on the run seed.
pub fn spawn_initial_population(world: &mut World) {
    let Some(config) = world.get_resource::<EcsSimConfig>().map(|c| c.0.clone()) else {
        tracing::warn!("initial population skipped: no EcsSimConfig");
        return;
    };
    let Some(mut sim_rng) = world.remove_resource::<SimRng>() else {
        tracing::warn!("initial population skipped: no SimRng");
        return;
    };

    let population = [
        (Species::Prey, config.population.prey),
        (Species::Predator, config.population.predators),
        (Species::AggregationAgent, config.population.aggregation_agents),
    ];
    for (species, count) in population {
        for _ in 0..count {
            let rng = &mut sim_rng.rng;
            let position = Vec2::new(
                rng.random_range(0.0..config.world.width),
                rng.random_range(0.0..config.world.height),
            );
            let state = Behavior::newborn(species, &config, rng);
            let heading = match &state {
                Behavior::Aggregation(s) => s.direction,
                _ => random_heading(rng),
            };
            let Some(id) = world
                .get_resource_mut::<AgentRegistry>()
                .map(|mut registry| registry.allocate_id())
            else {
                break;
            };
            spawn_agent(world, id, state, position, heading);
        }
    }

    world.insert_resource(sim_rng);
}
