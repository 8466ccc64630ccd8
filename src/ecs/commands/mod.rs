pub mod applicator;
mod apply_lifecycle;

use crate::behavior::Behavior;
use crate::id::AgentId;
use crate::model::Vec2;

pub use applicator::{CommitReport, LastCommit, apply_lifecycle_mutations};

/// A deferred change to the set of live agents.
///
/// Agent updates queue these on the `AgentRegistry`; the applicator in
/// `SimPhase::PostUpdate` commits them in one pass: kills first, then reproductions,
/// then spawns.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleMutation {
    /// Materialise an agent whose id was already allocated.
    Spawn {
        id: AgentId,
        parent: Option<AgentId>,
        state: Behavior,
        position: Vec2,
    },
    Kill(AgentId),
    /// Spawn a newborn of the parent's species at the parent's position.
    Reproduce(AgentId),
}
