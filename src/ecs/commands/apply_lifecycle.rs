use bevy_ecs::world::World;

use crate::behavior::Behavior;
use crate::ecs::components::{Agent, Position};
use crate::ecs::spawn::spawn_agent;
use crate::id::AgentId;
use crate::model::{Species, Vec2};
use crate::stochastic::random_heading;

use super::applicator::ApplyCtx;

/// Parent data captured for a birth before kills are applied.
pub(crate) struct Birth {
    parent: AgentId,
    species: Species,
    position: Vec2,
}

/// Look up every reproducing parent while all of them still exist.
pub(crate) fn capture_births(ctx: &ApplyCtx, world: &World, parents: &[AgentId]) -> Vec<Birth> {
    parents
        .iter()
        .filter_map(|&parent| {
            let entity = ctx.registry.entity(parent)?;
            let agent = world.get::<Agent>(entity)?;
            let position = world.get::<Position>(entity)?;
            Some(Birth {
                parent,
                species: agent.species,
                position: position.0,
            })
        })
        .collect()
}

/// Remove an agent. Unknown ids are stale and skipped.
pub(crate) fn apply_kill(ctx: &mut ApplyCtx, world: &mut World, id: AgentId) {
    let Some(entity) = ctx.registry.unregister(id) else {
        tracing::debug!(%id, "stale kill skipped");
        return;
    };
    world.despawn(entity);
    tracing::trace!(%id, "agent removed");
    ctx.report.killed += 1;
}

/// Spawn a newborn of the parent's species at the parent's position.
pub(crate) fn apply_birth(ctx: &mut ApplyCtx, world: &mut World, birth: Birth) {
    let id = ctx.registry.allocate_id();
    let state = Behavior::newborn(birth.species, &ctx.config, &mut ctx.rng);
    tracing::trace!(%id, parent = %birth.parent, "agent born");
    materialise(ctx, world, id, state, birth.position);
}

/// Materialise an agent queued through `AgentRegistry::spawn`.
pub(crate) fn apply_spawn(
    ctx: &mut ApplyCtx,
    world: &mut World,
    id: AgentId,
    parent: Option<AgentId>,
    state: Behavior,
    position: Vec2,
) {
    if ctx.registry.entity(id).is_some() {
        tracing::debug!(%id, "duplicate spawn skipped");
        return;
    }
    if let Some(parent) = parent {
        tracing::trace!(%id, %parent, "agent spawned");
    }
    let position = ctx.config.world.wrap(position);
    materialise(ctx, world, id, state, position);
}

fn materialise(ctx: &mut ApplyCtx, world: &mut World, id: AgentId, state: Behavior, position: Vec2) {
    let heading = match &state {
        Behavior::Aggregation(s) => s.direction,
        _ => random_heading(&mut ctx.rng),
    };
    let entity = spawn_agent(world, id, state, position, heading);
    ctx.registry.register(id, entity);
    ctx.report.born += 1;
}
