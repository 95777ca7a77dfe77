//! The physics world: body storage, the layer table, and the fixed
//! substep simulation loop.

use std::collections::HashMap;

use itertools::izip;
use thunderdome::Arena;

use crate::body::Body;
use crate::collision::broadphase::{pair_key, BroadPhase, BroadPhaseEntry, SweepAndPrune};
use crate::collision::{narrowphase, query, Collision, Contacts};
use crate::layer::{LayerError, LayerMatrix, LayerRef};
use crate::math::Vec2;
use crate::solver;

/// Key type to look up bodies stored in a world.
pub type BodyKey = thunderdome::Index;

/// Where a collision is in its lifecycle across substeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactEventKind {
    /// The pair was not colliding in the previous substep.
    Enter,
    /// The pair was already colliding in the previous substep.
    Stay,
    /// The pair stopped colliding this substep. The collision carries
    /// the state from the last substep it was seen in.
    Exit,
}

/// A collision lifecycle event reported by [`PhysicsWorld::step`].
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    pub kind: ContactEventKind,
    pub collision: Collision,
}

/// A self-contained 2D physics simulation.
pub struct PhysicsWorld {
    bodies: Arena<Body>,
    /// The layer interaction table. Configure layers here before
    /// inserting bodies that use them.
    pub layers: LayerMatrix,
    broad_phase: Box<dyn BroadPhase>,
    in_progress: HashMap<(u64, u64), Collision>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create an empty world with the default sweep and prune broad phase.
    pub fn new() -> Self {
        PhysicsWorld {
            bodies: Arena::new(),
            layers: LayerMatrix::new(),
            broad_phase: Box::new(SweepAndPrune),
            in_progress: HashMap::new(),
        }
    }

    /// Replace the broad phase strategy.
    pub fn set_broad_phase(&mut self, broad_phase: impl BroadPhase + 'static) {
        self.broad_phase = Box::new(broad_phase);
    }

    pub fn with_broad_phase(mut self, broad_phase: impl BroadPhase + 'static) -> Self {
        self.set_broad_phase(broad_phase);
        self
    }

    /// Add a body to the world. Fails if the body refers to a layer
    /// that hasn't been registered.
    pub fn insert(&mut self, body: Body) -> Result<BodyKey, LayerError> {
        if !self.layers.layer_exists(body.layer()) {
            return Err(LayerError::UndefinedIndex(body.layer()));
        }
        let mut body = body;
        body.refresh();
        Ok(self.bodies.insert(body))
    }

    /// Remove a body. Collisions it was involved in are dropped
    /// without producing exit events.
    pub fn remove(&mut self, key: BodyKey) -> Option<Body> {
        let body = self.bodies.remove(key)?;
        self.in_progress
            .retain(|_, collision| !collision.involves(key));
        Some(body)
    }

    pub fn get(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    pub fn get_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyKey, &Body)> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Move a body onto another layer, referenced by index or name.
    pub fn set_layer<'a>(
        &mut self,
        key: BodyKey,
        layer: impl Into<LayerRef<'a>>,
    ) -> Result<(), LayerError> {
        let index = self.layers.resolve(layer.into())?;
        if let Some(body) = self.bodies.get_mut(key) {
            body.set_layer_index(index);
        }
        Ok(())
    }

    /// The collisions active as of the last substep.
    pub fn collisions_in_progress(&self) -> impl Iterator<Item = &Collision> {
        self.in_progress.values()
    }

    /// The topmost body containing a world-space point, if any.
    pub fn query_point_body(&self, point: Vec2) -> Option<BodyKey> {
        self.bodies
            .iter()
            .find(|(_, body)| query::point_body_bool(point, body))
            .map(|(key, _)| key)
    }

    /// Advance the simulation by `dt` seconds in `substeps` equal
    /// increments, returning the collision lifecycle events of every
    /// substep in order.
    pub fn step(&mut self, dt: f64, substeps: usize) -> Vec<ContactEvent> {
        let mut events = Vec::new();
        if substeps == 0 {
            return events;
        }
        let sub_dt = dt / substeps as f64;
        for _ in 0..substeps {
            self.substep(sub_dt, &mut events);
        }
        events
    }

    fn substep(&mut self, dt: f64, events: &mut Vec<ContactEvent>) {
        for (_, body) in self.bodies.iter_mut() {
            body.integrate(dt);
            body.refresh();
        }

        let entries: Vec<BroadPhaseEntry> = self
            .bodies
            .iter()
            .map(|(key, body)| BroadPhaseEntry {
                key,
                aabb: body.bounding_box(),
            })
            .collect();
        let candidates = self.broad_phase.pairs(&entries);
        log::trace!(
            "broad phase: {} candidate pairs from {} bodies",
            candidates.len(),
            entries.len()
        );

        // (event kind, pair key) in detection order; contacts and
        // responses are computed after depenetration below
        let mut detected: Vec<(ContactEventKind, (u64, u64))> = Vec::new();
        let mut new_in_progress: HashMap<(u64, u64), Collision> = HashMap::new();
        let mut corrections: Vec<(BodyKey, Vec2)> = Vec::new();

        for pair in candidates {
            let (Some(body1), Some(body2)) = (self.bodies.get(pair[0]), self.bodies.get(pair[1]))
            else {
                continue;
            };
            if !self
                .layers
                .interaction_by_index(body1.layer(), body2.layer())
            {
                continue;
            }
            let Some(pen) = narrowphase::intersection_check(body1, body2) else {
                continue;
            };
            let key = pair_key(pair[0], pair[1]);
            if new_in_progress.contains_key(&key) {
                continue;
            }

            let collision = Collision {
                bodies: pair,
                depth: pen.depth,
                normal: pen.normal,
                contacts: Contacts::Zero,
                is_trigger: body1.is_trigger || body2.is_trigger,
            };
            if !collision.is_trigger {
                let offsets = solver::positional_correction(&collision, body1, body2);
                for (body_key, offset) in izip!(pair, offsets) {
                    if offset != Vec2::zero() {
                        corrections.push((body_key, offset));
                    }
                }
            }
            let kind = if self.in_progress.contains_key(&key) {
                ContactEventKind::Stay
            } else {
                ContactEventKind::Enter
            };
            detected.push((kind, key));
            new_in_progress.insert(key, collision);
        }

        let previous = std::mem::replace(&mut self.in_progress, new_in_progress);
        for (key, collision) in previous {
            if !self.in_progress.contains_key(&key) {
                events.push(ContactEvent {
                    kind: ContactEventKind::Exit,
                    collision,
                });
            }
        }

        for (key, offset) in corrections {
            if let Some(body) = self.bodies.get_mut(key) {
                body.translate(offset);
                body.refresh();
            }
        }

        // contact points reflect the corrected positions
        for (kind, key) in detected {
            let Some(collision) = self.in_progress.get_mut(&key) else {
                continue;
            };
            let [key1, key2] = collision.bodies;
            let (Some(body1), Some(body2)) = self.bodies.get2_mut(key1, key2) else {
                continue;
            };
            collision.contacts = narrowphase::find_contacts(body1, body2, collision.normal);
            if !collision.is_trigger {
                solver::velocity_response(collision, body1, body2);
            }
            events.push(ContactEvent {
                kind,
                collision: *collision,
            });
        }
    }
}
