//! A k-d tree broad phase that recursively halves the world along
//! alternating axes.

use std::collections::HashSet;

use crate::collision::broadphase::{pair_key, BroadPhase, BroadPhaseEntry};
use crate::world::BodyKey;

/// Recursive median splits along alternating axes, brute force within
/// each leaf partition.
///
/// The split axis alternates per level starting with x. Entries whose
/// bounding box straddles a separator go to both sides, so the same
/// pair can meet in several leaves; results are deduplicated globally.
#[derive(Clone, Copy, Debug)]
pub struct KdTree {
    max_depth: usize,
}

impl KdTree {
    pub fn new(max_depth: usize) -> Self {
        KdTree { max_depth }
    }

    fn split(
        &self,
        entries: &[BroadPhaseEntry],
        mut partition: Vec<usize>,
        depth: usize,
        seen: &mut HashSet<(u64, u64)>,
        pairs: &mut Vec<[BodyKey; 2]>,
    ) {
        if depth >= self.max_depth || partition.len() <= 1 {
            for (i, &e1) in partition.iter().enumerate() {
                for &e2 in &partition[(i + 1)..] {
                    if !entries[e1].aabb.overlaps(&entries[e2].aabb) {
                        continue;
                    }
                    let key = pair_key(entries[e1].key, entries[e2].key);
                    if seen.insert(key) {
                        pairs.push([entries[e1].key, entries[e2].key]);
                    }
                }
            }
            return;
        }

        let horizontal = depth % 2 == 1;
        let min_on_axis = |i: usize| {
            let aabb = &entries[i].aabb;
            if horizontal {
                aabb.min.x
            } else {
                aabb.min.y
            }
        };
        let max_on_axis = |i: usize| {
            let aabb = &entries[i].aabb;
            if horizontal {
                aabb.max.x
            } else {
                aabb.max.y
            }
        };

        partition.sort_unstable_by(|&a, &b| min_on_axis(a).total_cmp(&min_on_axis(b)));
        let median = partition.len() / 2;
        let separator = min_on_axis(partition[median]);

        let mut right = partition.split_off(median);
        let left = partition;
        // entries straddling the separator are visible from both sides
        for &i in &left {
            if max_on_axis(i) >= separator {
                right.push(i);
            }
        }

        self.split(entries, left, depth + 1, seen, pairs);
        self.split(entries, right, depth + 1, seen, pairs);
    }
}

impl Default for KdTree {
    fn default() -> Self {
        KdTree::new(10)
    }
}

impl BroadPhase for KdTree {
    fn pairs(&self, entries: &[BroadPhaseEntry]) -> Vec<[BodyKey; 2]> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        let all: Vec<usize> = (0..entries.len()).collect();
        self.split(entries, all, 1, &mut seen, &mut pairs);
        pairs
    }
}
