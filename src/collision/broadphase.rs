//! Broad phase: cheaply cull the set of body pairs down to candidates
//! whose bounding boxes could plausibly overlap.

use crate::math::AABB;
use crate::world::BodyKey;

/// One body's view given to the broad phase: its key and current
/// world-space bounding box.
#[derive(Clone, Copy, Debug)]
pub struct BroadPhaseEntry {
    pub key: BodyKey,
    pub aabb: AABB,
}

/// A strategy for generating candidate collision pairs.
///
/// Implementors must return each unordered pair at most once and never
/// pair an entry with itself. They may return pairs that don't actually
/// overlap; the narrow phase rejects those.
pub trait BroadPhase {
    fn pairs(&self, entries: &[BroadPhaseEntry]) -> Vec<[BodyKey; 2]>;
}

/// A canonical map key for an unordered body pair.
#[inline]
pub(crate) fn pair_key(a: BodyKey, b: BodyKey) -> (u64, u64) {
    let (a, b) = (a.to_bits(), b.to_bits());
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The simplest possible broad phase: check every unique pair.
///
/// O(n²) but with no setup cost at all, which wins for small worlds
/// and serves as ground truth for the others in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn pairs(&self, entries: &[BroadPhaseEntry]) -> Vec<[BodyKey; 2]> {
        let mut pairs = Vec::new();
        for (i, e1) in entries.iter().enumerate() {
            for e2 in &entries[(i + 1)..] {
                if e1.aabb.overlaps(&e2.aabb) {
                    pairs.push([e1.key, e2.key]);
                }
            }
        }
        pairs
    }
}

/// Sweep and prune along the x axis.
///
/// Entries are sorted by the left edge of their bounding box and swept
/// left to right; an entry stays in the active set until the sweep
/// passes its right edge. Only x intervals are compared, so pairs
/// separated purely in y still come out as candidates.
#[derive(Clone, Copy, Debug, Default)]
pub struct SweepAndPrune;

impl BroadPhase for SweepAndPrune {
    fn pairs(&self, entries: &[BroadPhaseEntry]) -> Vec<[BodyKey; 2]> {
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_unstable_by(|&a, &b| {
            entries[a]
                .aabb
                .min
                .x
                .total_cmp(&entries[b].aabb.min.x)
        });

        let mut pairs = Vec::new();
        let mut active: Vec<usize> = Vec::new();
        for &current in &order {
            let left_edge = entries[current].aabb.min.x;
            active.retain(|&other| {
                if entries[other].aabb.max.x < left_edge {
                    false
                } else {
                    pairs.push([entries[other].key, entries[current].key]);
                    true
                }
            });
            active.push(current);
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use thunderdome::Arena;

    fn entries_from(boxes: &[AABB]) -> (Vec<BodyKey>, Vec<BroadPhaseEntry>) {
        let mut arena: Arena<()> = Arena::new();
        let keys: Vec<BodyKey> = boxes.iter().map(|_| arena.insert(())).collect();
        let entries = keys
            .iter()
            .zip(boxes)
            .map(|(&key, &aabb)| BroadPhaseEntry { key, aabb })
            .collect();
        (keys, entries)
    }

    fn sorted_keys(mut pairs: Vec<[BodyKey; 2]>) -> Vec<(u64, u64)> {
        let mut keys: Vec<(u64, u64)> = pairs
            .drain(..)
            .map(|[a, b]| pair_key(a, b))
            .collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn brute_force_finds_overlaps() {
        let (keys, entries) = entries_from(&[
            AABB::centered(Vec2::new(0.0, 0.0), 1.0, 1.0),
            AABB::centered(Vec2::new(1.5, 0.0), 1.0, 1.0),
            AABB::centered(Vec2::new(10.0, 0.0), 1.0, 1.0),
        ]);
        let pairs = BruteForce.pairs(&entries);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pair_key(pairs[0][0], pairs[0][1]), pair_key(keys[0], keys[1]));
    }

    #[test]
    fn sweep_and_prune_ignores_y() {
        // overlapping x intervals but disjoint in y: still a candidate
        let (_, entries) = entries_from(&[
            AABB::centered(Vec2::new(0.0, 0.0), 1.0, 1.0),
            AABB::centered(Vec2::new(0.5, 10.0), 1.0, 1.0),
        ]);
        assert_eq!(SweepAndPrune.pairs(&entries).len(), 1);
    }

    #[test]
    fn sweep_and_prune_superset_of_brute_force() {
        let (_, entries) = entries_from(&[
            AABB::centered(Vec2::new(0.0, 0.0), 2.0, 2.0),
            AABB::centered(Vec2::new(3.0, 0.0), 2.0, 2.0),
            AABB::centered(Vec2::new(3.0, 8.0), 2.0, 2.0),
            AABB::centered(Vec2::new(20.0, 0.0), 2.0, 2.0),
            AABB::centered(Vec2::new(21.0, 1.0), 2.0, 2.0),
        ]);
        let exact = sorted_keys(BruteForce.pairs(&entries));
        let swept = sorted_keys(SweepAndPrune.pairs(&entries));
        for pair in &exact {
            assert!(swept.contains(pair));
        }
        // no duplicates
        let mut deduped = swept.clone();
        deduped.dedup();
        assert_eq!(swept, deduped);
    }

    #[test]
    fn empty_and_single_entry() {
        let (_, entries) = entries_from(&[AABB::centered(Vec2::zero(), 1.0, 1.0)]);
        assert!(BruteForce.pairs(&[]).is_empty());
        assert!(SweepAndPrune.pairs(&entries).is_empty());
    }
}
