use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;

use crate::behavior::Behavior;
use crate::ecs::commands::LifecycleMutation;
use crate::id::{AgentId, IdGenerator};
use crate::model::Vec2;

/// Authoritative set of live agents plus the lifecycle requests of the current tick.
///
/// Maps agent ids to Bevy entities. Kill, reproduce and spawn requests are only queued
/// here; the world changes when `apply_lifecycle_mutations` commits them.
#[derive(Resource, Debug, Default)]
pub struct AgentRegistry {
    id_gen: IdGenerator,
    entities: BTreeMap<AgentId, Entity>,
    pending_kills: BTreeSet<AgentId>,
    queue: Vec<LifecycleMutation>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id now and materialise the agent at the next commit.
    pub fn spawn(&mut self, state: Behavior, position: Vec2, parent: Option<AgentId>) -> AgentId {
        let id = self.id_gen.next_id();
        self.queue.push(LifecycleMutation::Spawn {
            id,
            parent,
            state,
            position,
        });
        id
    }

    /// Mark `id` for removal at the next commit.
    ///
    /// Repeated requests within a tick collapse into one. Returns false for ids that
    /// are not registered.
    pub fn request_kill(&mut self, id: AgentId) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }
        if self.pending_kills.insert(id) {
            self.queue.push(LifecycleMutation::Kill(id));
        }
        true
    }

    /// Queue a birth from `parent`. Ignored (false) when the parent is unknown or
    /// already marked for removal.
    pub fn request_reproduce(&mut self, parent: AgentId) -> bool {
        if !self.is_alive(parent) {
            return false;
        }
        self.queue.push(LifecycleMutation::Reproduce(parent));
        true
    }

    /// Registered and not killed earlier in the current tick.
    pub fn is_alive(&self, id: AgentId) -> bool {
        self.entities.contains_key(&id) && !self.pending_kills.contains(&id)
    }

    /// Live ids in ascending order.
    pub fn live_ids(&self) -> Vec<AgentId> {
        self.entities
            .keys()
            .filter(|id| !self.pending_kills.contains(id))
            .copied()
            .collect()
    }

    /// Registered agents, including any marked for removal this tick.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: AgentId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }

    /// `(id, entity)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, Entity)> + '_ {
        self.entities.iter().map(|(id, entity)| (*id, *entity))
    }

    #[cfg(test)]
    pub(crate) fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// The id the next spawn will receive.
    #[cfg(test)]
    pub(crate) fn peek_next_id(&self) -> AgentId {
        self.id_gen.peek()
    }

    pub(crate) fn allocate_id(&mut self) -> AgentId {
        self.id_gen.next_id()
    }

    /// Insert a mapping. Returns false if the id was already registered.
    pub(crate) fn register(&mut self, id: AgentId, entity: Entity) -> bool {
        if self.entities.contains_key(&id) {
            return false;
        }
        self.entities.insert(id, entity);
        true
    }

    pub(crate) fn unregister(&mut self, id: AgentId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Drain this tick's requests in emission order and reset per-tick state.
    pub(crate) fn take_pending(&mut self) -> Vec<LifecycleMutation> {
        self.pending_kills.clear();
        std::mem::take(&mut self.queue)
    }
}
