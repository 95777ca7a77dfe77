//! Collision detection: broad phase pair culling, narrow phase
//! intersection tests and contact point extraction.

pub mod broadphase;
pub use broadphase::{BroadPhase, BroadPhaseEntry, BruteForce, SweepAndPrune};

pub mod grid;
pub use grid::GridPartition;

pub mod kdtree;
pub use kdtree::KdTree;

pub mod narrowphase;
pub use narrowphase::Penetration;

pub mod query;

use crate::math::{Unit, Vec2};
use crate::world::BodyKey;

/// 0-2 points of contact can occur between two 2D objects.
#[derive(Clone, Copy, Debug)]
pub enum Contacts {
    Zero,
    One(Vec2),
    Two(Vec2, Vec2),
}

impl Contacts {
    pub fn iter(&self) -> ContactIterator<'_> {
        ContactIterator { contacts: self, idx: 0 }
    }

    pub fn len(&self) -> usize {
        match self {
            Contacts::Zero => 0,
            Contacts::One(_) => 1,
            Contacts::Two(_, _) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Contacts::Zero)
    }
}

/// An iterator over the points in a [`Contacts`].
pub struct ContactIterator<'a> {
    contacts: &'a Contacts,
    idx: u8,
}

impl<'a> Iterator for ContactIterator<'a> {
    type Item = Vec2;

    fn next(&mut self) -> Option<Self::Item> {
        self.idx += 1;
        use Contacts::*;
        match (self.contacts, self.idx - 1) {
            (Zero, _) => None,
            (One(c), 0) => Some(*c),
            (One(_), _) => None,
            (Two(c1, _), 0) => Some(*c1),
            (Two(_, c2), 1) => Some(*c2),
            (Two(_, _), _) => None,
        }
    }
}

/// An intersection between two bodies during one substep.
#[derive(Clone, Copy, Debug)]
pub struct Collision {
    /// The participating bodies. The pair is unordered for identity
    /// purposes; the normal convention refers to this stored order.
    pub bodies: [BodyKey; 2],
    /// Penetration depth along the normal, always >= 0.
    pub depth: f64,
    /// Unit collision normal, pointing from `bodies[1]` toward `bodies[0]`.
    pub normal: Unit<Vec2>,
    /// World-space contact points.
    pub contacts: Contacts,
    /// True if either body is a trigger; suppresses physical response
    /// while still generating events.
    pub is_trigger: bool,
}

impl Collision {
    /// Get the other body involved in this collision.
    pub fn other(&self, this_body: BodyKey) -> BodyKey {
        if self.bodies[0] == this_body {
            self.bodies[1]
        } else {
            self.bodies[0]
        }
    }

    /// Whether this collision involves the given body.
    pub fn involves(&self, body: BodyKey) -> bool {
        self.bodies[0] == body || self.bodies[1] == body
    }
}
