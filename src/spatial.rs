//! Uniform-grid proximity index over agent positions.
//!
//! The index is rebuilt wholesale once per tick from every registered agent and is
//! read-only while agents update. Liveness filtering happens at query time through a
//! caller-supplied predicate, so agents killed earlier in a tick disappear from later
//! queries without touching the grid.

use crate::error::ConfigError;
use crate::id::AgentId;
use crate::model::{Species, Vec2};

/// One indexed agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    pub id: AgentId,
    pub species: Species,
    pub position: Vec2,
}

/// A query hit, with its distance to the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: AgentId,
    pub species: Species,
    pub position: Vec2,
    pub distance: f64,
}

/// Read-only proximity view handed to the species behaviours.
pub trait Neighborhood {
    /// Agents within `radius` of `point` (inclusive), nearest first, ties by id.
    fn within(&self, point: Vec2, radius: f64) -> Vec<Neighbor>;

    /// The `k` agents nearest to `point`, nearest first, ties by id.
    fn nearest(&self, point: Vec2, k: usize) -> Vec<Neighbor>;
}

// Grids are capped relative to the population so sparse, wide worlds do not allocate
// millions of empty buckets; the cell edge doubles until the grid fits.
const MIN_CELL_BUDGET: usize = 1024;
const CELLS_PER_ENTRY: usize = 4;

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    effective_cell: f64,
    origin: Vec2,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<u32>>,
    entries: Vec<IndexEntry>,
}

impl SpatialIndex {
    pub fn new(cell_size: f64) -> Result<Self, ConfigError> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(ConfigError::NotPositive {
                field: "cell_size",
                value: cell_size,
            });
        }
        Ok(Self {
            cell_size,
            effective_cell: cell_size,
            origin: Vec2::ZERO,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            entries: Vec::new(),
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Replace the index contents. O(n) bucketing.
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = IndexEntry>) {
        self.entries.clear();
        self.entries.extend(entries);
        self.cells.clear();
        if self.entries.is_empty() {
            self.cols = 0;
            self.rows = 0;
            return;
        }

        let (mut min, mut max) = (self.entries[0].position, self.entries[0].position);
        for e in &self.entries {
            min.x = min.x.min(e.position.x);
            min.y = min.y.min(e.position.y);
            max.x = max.x.max(e.position.x);
            max.y = max.y.max(e.position.y);
        }
        self.origin = min;

        let budget = (self.entries.len() * CELLS_PER_ENTRY).max(MIN_CELL_BUDGET);
        let mut cell = self.cell_size;
        let (cols, rows) = loop {
            let cols = ((max.x - min.x) / cell).floor() as usize + 1;
            let rows = ((max.y - min.y) / cell).floor() as usize + 1;
            if cols.saturating_mul(rows) <= budget {
                break (cols, rows);
            }
            cell *= 2.0;
        };
        self.effective_cell = cell;
        self.cols = cols;
        self.rows = rows;
        self.cells.resize_with(cols * rows, Vec::new);

        for (i, e) in self.entries.iter().enumerate() {
            let (cx, cy) = self.cell_of(e.position);
            let slot = self.clamp_col(cx) + self.clamp_row(cy) * self.cols;
            self.cells[slot].push(i as u32);
        }
    }

    /// All entries within `radius` of `point` accepted by `keep`.
    pub fn query_filtered(
        &self,
        point: Vec2,
        radius: f64,
        keep: impl Fn(&IndexEntry) -> bool,
    ) -> Vec<Neighbor> {
        let mut hits = Vec::new();
        if self.entries.is_empty() || !(radius >= 0.0) {
            return hits;
        }
        let (x0, y0) = self.cell_of(Vec2::new(point.x - radius, point.y - radius));
        let (x1, y1) = self.cell_of(Vec2::new(point.x + radius, point.y + radius));
        if x1 < 0 || y1 < 0 || x0 >= self.cols as i64 || y0 >= self.rows as i64 {
            return hits;
        }
        let radius_sq = radius * radius;
        for cy in self.clamp_row(y0)..=self.clamp_row(y1) {
            for cx in self.clamp_col(x0)..=self.clamp_col(x1) {
                for &i in &self.cells[cx + cy * self.cols] {
                    let e = &self.entries[i as usize];
                    if e.position.distance_squared(point) <= radius_sq && keep(e) {
                        hits.push(neighbor(e, point));
                    }
                }
            }
        }
        sort_hits(&mut hits);
        hits
    }

    pub fn query(&self, point: Vec2, radius: f64) -> Vec<Neighbor> {
        self.query_filtered(point, radius, |_| true)
    }

    pub fn query_ids(&self, point: Vec2, radius: f64) -> Vec<AgentId> {
        self.query(point, radius).into_iter().map(|n| n.id).collect()
    }

    /// The `k` nearest entries accepted by `keep`.
    ///
    /// Searches rings of cells outwards from the query cell. After ring `r`, every
    /// unvisited entry is at least `r * cell` away, so the search stops once the
    /// `k`-th candidate is strictly closer than that.
    pub fn query_k_nearest_filtered(
        &self,
        point: Vec2,
        k: usize,
        keep: impl Fn(&IndexEntry) -> bool,
    ) -> Vec<Neighbor> {
        let mut found = Vec::new();
        if k == 0 || self.entries.is_empty() {
            return found;
        }
        let (qx, qy) = self.cell_of(point);
        let last_ring = [
            qx,
            self.cols as i64 - 1 - qx,
            qy,
            self.rows as i64 - 1 - qy,
        ]
        .into_iter()
        .map(i64::abs)
        .max()
        .unwrap_or(0);

        for ring in 0..=last_ring {
            for (cx, cy) in ring_cells(qx, qy, ring) {
                if cx < 0 || cy < 0 || cx >= self.cols as i64 || cy >= self.rows as i64 {
                    continue;
                }
                for &i in &self.cells[cx as usize + cy as usize * self.cols] {
                    let e = &self.entries[i as usize];
                    if keep(e) {
                        found.push(neighbor(e, point));
                    }
                }
            }
            if found.len() >= k {
                sort_hits(&mut found);
                let covered = ring as f64 * self.effective_cell;
                if found[k - 1].distance < covered {
                    found.truncate(k);
                    return found;
                }
            }
        }
        sort_hits(&mut found);
        found.truncate(k);
        found
    }

    pub fn query_k_nearest(&self, point: Vec2, k: usize) -> Vec<Neighbor> {
        self.query_k_nearest_filtered(point, k, |_| true)
    }

    fn cell_of(&self, p: Vec2) -> (i64, i64) {
        (
            ((p.x - self.origin.x) / self.effective_cell).floor() as i64,
            ((p.y - self.origin.y) / self.effective_cell).floor() as i64,
        )
    }

    fn clamp_col(&self, c: i64) -> usize {
        c.clamp(0, self.cols as i64 - 1) as usize
    }

    fn clamp_row(&self, r: i64) -> usize {
        r.clamp(0, self.rows as i64 - 1) as usize
    }
}

impl Neighborhood for SpatialIndex {
    fn within(&self, point: Vec2, radius: f64) -> Vec<Neighbor> {
        self.query(point, radius)
    }

    fn nearest(&self, point: Vec2, k: usize) -> Vec<Neighbor> {
        self.query_k_nearest(point, k)
    }
}

fn neighbor(e: &IndexEntry, point: Vec2) -> Neighbor {
    Neighbor {
        id: e.id,
        species: e.species,
        position: e.position,
        distance: e.position.distance(point),
    }
}

fn sort_hits(hits: &mut [Neighbor]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
}

/// Cells at Chebyshev distance exactly `ring` from `(qx, qy)`.
fn ring_cells(qx: i64, qy: i64, ring: i64) -> impl Iterator<Item = (i64, i64)> {
    (-ring..=ring).flat_map(move |dy| {
        (-ring..=ring)
            .filter(move |dx| dx.abs() == ring || dy.abs() == ring)
            .map(move |dx| (qx + dx, qy + dy))
    })
}
