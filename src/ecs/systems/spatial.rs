//! Spatial index rebuild (PreUpdate) and the liveness-aware query view.

use bevy_app::App;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Query, ResMut};

use crate::ecs::components::{Agent, Position};
use crate::ecs::resources::{AgentRegistry, EcsSpatialIndex};
use crate::ecs::schedule::{SimPhase, SimTick};
use crate::id::AgentId;
use crate::model::Vec2;
use crate::spatial::{IndexEntry, Neighbor, Neighborhood, SpatialIndex};

pub fn add_spatial_systems(app: &mut App) {
    app.add_systems(SimTick, rebuild_spatial_index.in_set(SimPhase::PreUpdate));
}

/// Reindex every registered agent at its start-of-tick position.
pub fn rebuild_spatial_index(
    agents: Query<(&Agent, &Position)>,
    mut index: ResMut<EcsSpatialIndex>,
) {
    index.0.rebuild(agents.iter().map(|(agent, position)| IndexEntry {
        id: agent.id,
        species: agent.species,
        position: position.0,
    }));
}

/// Frozen index filtered by current liveness, as seen by one agent.
///
/// Excludes the querying agent and anything killed earlier in the tick. Agents born
/// this tick are not in the index yet.
pub struct LiveNeighborhood<'a> {
    pub index: &'a SpatialIndex,
    pub registry: &'a AgentRegistry,
    pub exclude: AgentId,
}

impl LiveNeighborhood<'_> {
    fn keep(&self, entry: &IndexEntry) -> bool {
        entry.id != self.exclude && self.registry.is_alive(entry.id)
    }
}

impl Neighborhood for LiveNeighborhood<'_> {
    fn within(&self, point: Vec2, radius: f64) -> Vec<Neighbor> {
        self.index.query_filtered(point, radius, |e| self.keep(e))
    }

    fn nearest(&self, point: Vec2, k: usize) -> Vec<Neighbor> {
        self.index.query_k_nearest_filtered(point, k, |e| self.keep(e))
    }
}

#[cfg(test)]
mod tests {
    use bevy_ecs::world::World;

    use super::*;
    use crate::model::Species;

    #[test]
    fn live_view_hides_self_and_killed_agents() {
        let mut world = World::new();
        let mut registry = AgentRegistry::new();
        let mut entries = Vec::new();
        for x in 0..4 {
            let id = registry.allocate_id();
            registry.register(id, world.spawn_empty().id());
            entries.push(IndexEntry {
                id,
                species: Species::Prey,
                position: Vec2::new(f64::from(x), 0.0),
            });
        }
        let mut index = SpatialIndex::new(5.0).unwrap();
        index.rebuild(entries);
        registry.request_kill(AgentId(3));

        let view = LiveNeighborhood {
            index: &index,
            registry: &registry,
            exclude: AgentId(1),
        };
        let within: Vec<AgentId> = view.within(Vec2::ZERO, 10.0).iter().map(|n| n.id).collect();
        assert_eq!(within, vec![AgentId(2), AgentId(4)]);
        let nearest: Vec<AgentId> = view.nearest(Vec2::ZERO, 1).iter().map(|n| n.id).collect();
        assert_eq!(nearest, vec![AgentId(2)]);
    }
}
