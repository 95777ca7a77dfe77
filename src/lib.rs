//! A discrete-time 2D rigid body physics engine with circle and convex
//! polygon shapes, pluggable broad phase collision detection, collision
//! layers, and a sequential impulse contact solver.

pub mod math;
pub use math::{uv, Rotor2, Unit, Vec2, AABB};

pub mod body;
pub use body::{Body, Mass, Material, Shape, ShapeConfigurationError, Velocity};

pub mod layer;
pub use layer::{LayerError, LayerMatrix, LayerRef, MAX_LAYERS};

pub mod collision;
pub use collision::{
    query, BroadPhase, BroadPhaseEntry, BruteForce, Collision, Contacts, GridPartition, KdTree,
    Penetration, SweepAndPrune,
};

pub(crate) mod solver;

pub mod world;
pub use world::{BodyKey, ContactEvent, ContactEventKind, PhysicsWorld};
