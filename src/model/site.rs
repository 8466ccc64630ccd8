use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Vec2;

/// Index of an aggregation site, in configuration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub u32);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "site_{}", self.0)
    }
}

/// Static rectangular aggregation region. Created once at start-up.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub center: Vec2,
    pub width: f64,
    pub height: f64,
}

impl Site {
    pub fn new(id: SiteId, center: Vec2, width: f64, height: f64) -> Self {
        Self {
            id,
            center,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.center.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.center.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.center.y + self.height / 2.0
    }

    /// Inclusive axis-aligned membership test.
    pub fn contains(&self, p: Vec2) -> bool {
        (self.left()..=self.right()).contains(&p.x) && (self.top()..=self.bottom()).contains(&p.y)
    }

    /// Axis directions that move `p` back towards the interior; empty when inside.
    pub fn inward_directions(&self, p: Vec2) -> Vec<Vec2> {
        let mut directions = Vec::with_capacity(2);
        if p.x < self.left() {
            directions.push(Vec2::new(1.0, 0.0));
        } else if p.x > self.right() {
            directions.push(Vec2::new(-1.0, 0.0));
        }
        if p.y < self.top() {
            directions.push(Vec2::new(0.0, 1.0));
        } else if p.y > self.bottom() {
            directions.push(Vec2::new(0.0, -1.0));
        }
        directions
    }
}

/// First site containing `p`, if any.
pub fn site_at(sites: &[Site], p: Vec2) -> Option<&Site> {
    sites.iter().find(|site| site.contains(p))
}
