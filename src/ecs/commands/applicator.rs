use bevy_ecs::resource::Resource;
use bevy_ecs::world::World;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::ecs::resources::{AgentRegistry, EcsSimConfig, LifecycleRng};

use super::LifecycleMutation;
use super::apply_lifecycle;

/// What one commit changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub killed: u32,
    pub born: u32,
    /// Registered agents after the commit.
    pub live: u32,
}

/// Report of the most recent commit, read by the snapshot recorder.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct LastCommit(pub CommitReport);

/// Context passed to the `apply_*` functions, providing mutable access
/// to the resources they need without requiring direct World access.
pub(crate) struct ApplyCtx {
    pub registry: AgentRegistry,
    pub rng: SmallRng,
    pub config: SimConfig,
    pub report: CommitReport,
}

/// Exclusive system that drains the registry's queued lifecycle requests and applies
/// them to the world: kills (deduplicated, ascending id), then reproductions, then
/// spawns, each group in request order.
///
/// Runs in `SimPhase::PostUpdate`.
pub fn apply_lifecycle_mutations(world: &mut World) {
    let Some(mut registry) = world.remove_resource::<AgentRegistry>() else {
        tracing::warn!("lifecycle commit skipped: no AgentRegistry");
        return;
    };
    let pending = registry.take_pending();

    let config = world
        .get_resource::<EcsSimConfig>()
        .map(|c| c.0.clone())
        .unwrap_or_default();
    let rng = world
        .remove_resource::<LifecycleRng>()
        .unwrap_or_default()
        .0;

    let mut ctx = ApplyCtx {
        registry,
        rng,
        config,
        report: CommitReport::default(),
    };

    let mut kills = Vec::new();
    let mut reproductions = Vec::new();
    let mut spawns = Vec::new();
    for mutation in pending {
        match mutation {
            LifecycleMutation::Kill(id) => kills.push(id),
            LifecycleMutation::Reproduce(parent) => reproductions.push(parent),
            spawn @ LifecycleMutation::Spawn { .. } => spawns.push(spawn),
        }
    }
    kills.sort_unstable();
    kills.dedup();

    // Parents are looked up before any kill lands, so a birth requested before the
    // parent died in the same tick still happens.
    let births = apply_lifecycle::capture_births(&ctx, world, &reproductions);

    for id in kills {
        apply_lifecycle::apply_kill(&mut ctx, world, id);
    }
    for birth in births {
        apply_lifecycle::apply_birth(&mut ctx, world, birth);
    }
    for spawn in spawns {
        if let LifecycleMutation::Spawn {
            id,
            parent,
            state,
            position,
        } = spawn
        {
            apply_lifecycle::apply_spawn(&mut ctx, world, id, parent, state, position);
        }
    }

    ctx.report.live = ctx.registry.len() as u32;
    if ctx.report.killed > 0 || ctx.report.born > 0 {
        tracing::debug!(
            killed = ctx.report.killed,
            born = ctx.report.born,
            live = ctx.report.live,
            "lifecycle commit"
        );
    }

    world.insert_resource(LastCommit(ctx.report));
    world.insert_resource(LifecycleRng(ctx.rng));
    world.insert_resource(ctx.registry);
}

#[cfg(test)]
mod tests {
    use bevy_app::App;

    use super::*;
    use crate::behavior::{Behavior, PredatorState, PreyState};
    use crate::ecs::app::build_sim_app_for;
    use crate::ecs::components::{Agent, Heading, Position};
    use crate::ecs::spawn::spawn_agent;
    use crate::id::AgentId;
    use crate::model::{Species, Vec2};

    fn setup_app() -> App {
        build_sim_app_for(&SimConfig::predator_prey()).unwrap()
    }

    fn spawn_prey(app: &mut App, x: f64) -> AgentId {
        let world = app.world_mut();
        let id = world.resource_mut::<AgentRegistry>().allocate_id();
        spawn_agent(
            world,
            id,
            Behavior::Prey(PreyState::default()),
            Vec2::new(x, 0.0),
            Vec2::ZERO,
        );
        id
    }

    fn commit(app: &mut App) -> CommitReport {
        apply_lifecycle_mutations(app.world_mut());
        app.world().resource::<LastCommit>().0
    }

    fn count_agents(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query::<&Agent>().iter(world).count()
    }

    #[test]
    fn kills_despawn_and_unregister() {
        let mut app = setup_app();
        let a = spawn_prey(&mut app, 1.0);
        let b = spawn_prey(&mut app, 2.0);
        {
            let mut registry = app.world_mut().resource_mut::<AgentRegistry>();
            registry.request_kill(a);
            registry.request_kill(a);
        }
        let report = commit(&mut app);
        assert_eq!(report, CommitReport { killed: 1, born: 0, live: 1 });
        assert_eq!(count_agents(&mut app), 1);
        let registry = app.world().resource::<AgentRegistry>();
        assert!(!registry.is_alive(a));
        assert!(registry.is_alive(b));
    }

    #[test]
    fn reproduction_before_death_still_produces_child() {
        let mut app = setup_app();
        let parent = spawn_prey(&mut app, 7.0);
        {
            let mut registry = app.world_mut().resource_mut::<AgentRegistry>();
            registry.request_reproduce(parent);
            registry.request_kill(parent);
        }
        let report = commit(&mut app);
        assert_eq!(report, CommitReport { killed: 1, born: 1, live: 1 });

        let world = app.world_mut();
        let children: Vec<(Agent, Position, Behavior)> = world
            .query::<(&Agent, &Position, &Behavior)>()
            .iter(world)
            .map(|(a, p, b)| (*a, *p, b.clone()))
            .collect();
        assert_eq!(children.len(), 1);
        let (agent, position, state) = &children[0];
        assert_eq!(agent.species, Species::Prey);
        assert_ne!(agent.id, parent);
        assert_eq!(position.0, Vec2::new(7.0, 0.0));
        assert_eq!(state, &Behavior::Prey(PreyState::default()));
    }

    #[test]
    fn newborn_predators_start_with_full_energy() {
        let mut app = setup_app();
        let world = app.world_mut();
        let id = world.resource_mut::<AgentRegistry>().allocate_id();
        let tired = PredatorState {
            age: 5,
            energy: 12.0,
            ticks: 300,
            ticks_since_reproduction: 0,
        };
        spawn_agent(world, id, Behavior::Predator(tired), Vec2::ZERO, Vec2::ZERO);
        world.resource_mut::<AgentRegistry>().request_reproduce(id);
        commit(&mut app);

        let world = app.world_mut();
        let child = world
            .query::<(&Agent, &Behavior, &Heading)>()
            .iter(world)
            .find(|(a, _, _)| a.id != id)
            .map(|(_, b, h)| (b.clone(), *h))
            .unwrap();
        assert_eq!(child.0.age(), 0);
        assert_eq!(child.0.energy(), Some(100.0));
        assert!((child.1.0.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn queued_spawns_materialise_at_commit() {
        let mut app = setup_app();
        let id = app.world_mut().resource_mut::<AgentRegistry>().spawn(
            Behavior::Prey(PreyState::default()),
            Vec2::new(3.0, 4.0),
            None,
        );
        assert_eq!(count_agents(&mut app), 0);
        let report = commit(&mut app);
        assert_eq!(report.born, 1);
        assert!(app.world().resource::<AgentRegistry>().is_alive(id));
        assert_eq!(count_agents(&mut app), 1);
    }

    #[test]
    fn empty_commit_reports_live_count() {
        let mut app = setup_app();
        spawn_prey(&mut app, 0.0);
        assert_eq!(commit(&mut app), CommitReport { killed: 0, born: 0, live: 1 });
    }
}
