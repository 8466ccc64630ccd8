use bevy_ecs::component::Component;

use crate::id::AgentId;
use crate::model::{Species, Vec2};

/// Identity component present on every simulated agent.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    pub species: Species,
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

/// Move direction, scaled by the movement speed each tick. Zero while frozen in place.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Heading(pub Vec2);
