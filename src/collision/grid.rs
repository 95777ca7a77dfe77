//! A fixed uniform grid broad phase for worlds with known bounds.

use std::collections::HashSet;

use crate::collision::broadphase::{pair_key, BroadPhase, BroadPhaseEntry};
use crate::math::Vec2;
use crate::world::BodyKey;

/// A uniform grid over a fixed rectangular region of the world.
///
/// Each entry is inserted into every cell its bounding box touches and
/// candidates are the entries sharing at least one cell. Bodies fully
/// outside the region are silently left out of the candidate set, so
/// the region must cover everything that is expected to collide.
#[derive(Clone, Debug)]
pub struct GridPartition {
    origin: Vec2,
    extents: Vec2,
    columns: usize,
    rows: usize,
}

impl GridPartition {
    /// Create a grid of `columns` x `rows` cells covering the rectangle
    /// from `origin` (bottom-left) to `origin + (width, height)`.
    pub fn new(origin: Vec2, width: f64, height: f64, columns: usize, rows: usize) -> Self {
        assert!(columns > 0 && rows > 0, "grid must have at least one cell");
        assert!(width > 0.0 && height > 0.0, "grid extents must be positive");
        GridPartition {
            origin,
            extents: Vec2::new(width, height),
            columns,
            rows,
        }
    }

    /// The range of cells an interval `[min, max]` spans on one axis,
    /// or None if it lies entirely outside `[0, region_size]`.
    fn span(min: f64, max: f64, region_size: f64, cell_count: usize) -> Option<(usize, usize)> {
        if max < 0.0 || min > region_size {
            return None;
        }
        let cell_size = region_size / cell_count as f64;
        let first = ((min / cell_size).floor().max(0.0)) as usize;
        let last = ((max / cell_size).floor() as usize).min(cell_count - 1);
        Some((first.min(cell_count - 1), last))
    }
}

impl BroadPhase for GridPartition {
    fn pairs(&self, entries: &[BroadPhaseEntry]) -> Vec<[BodyKey; 2]> {
        let mut cells: Vec<Vec<usize>> = vec![Vec::new(); self.columns * self.rows];

        for (entry_idx, entry) in entries.iter().enumerate() {
            let min = entry.aabb.min - self.origin;
            let max = entry.aabb.max - self.origin;
            let Some((c0, c1)) = Self::span(min.x, max.x, self.extents.x, self.columns) else {
                continue;
            };
            let Some((r0, r1)) = Self::span(min.y, max.y, self.extents.y, self.rows) else {
                continue;
            };
            for row in r0..=r1 {
                for col in c0..=c1 {
                    cells[row * self.columns + col].push(entry_idx);
                }
            }
        }

        // entries spanning multiple cells meet more than once
        let mut seen: HashSet<(u64, u64)> = HashSet::new();
        let mut pairs = Vec::new();
        for cell in &cells {
            for (i, &e1) in cell.iter().enumerate() {
                for &e2 in &cell[(i + 1)..] {
                    let key = pair_key(entries[e1].key, entries[e2].key);
                    if seen.insert(key) {
                        pairs.push([entries[e1].key, entries[e2].key]);
                    }
                }
            }
        }
        pairs
    }
}
