pub mod geometry;
pub mod site;
pub mod snapshot;
pub mod species;

pub use geometry::{Vec2, WorldBounds};
pub use site::{Site, SiteId, site_at};
pub use snapshot::{AgentAnnotation, SiteCount, Snapshot};
pub use species::Species;
