pub mod agent;

pub use crate::behavior::Behavior;
pub use agent::{Agent, Heading, Position};
