//! Rigid bodies and their shapes.

use crate::math::{self as m, Rotor2, Vec2, AABB};

use thiserror::Error;

/// Error raised when a body is constructed with invalid shape parameters.
#[derive(Debug, Error)]
pub enum ShapeConfigurationError {
    #[error("circle radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("concave polygons are not supported")]
    ConcavePolygon,
    #[error("polygon has too many collinear vertices to enclose an area")]
    DegeneratePolygon,
}

/// Velocity of a body.
///
/// Equivalent to a Vec3 but with names for the translational and rotational part.
#[derive(Clone, Copy, Debug, Default)]
pub struct Velocity {
    /// Linear velocity in units per second.
    pub linear: Vec2,
    /// Angular velocity in radians per second.
    pub angular: f64,
}

impl Velocity {
    /// Get the linear velocity of a point offset from the center of mass.
    pub fn point_velocity(&self, offset: Vec2) -> Vec2 {
        self.linear + m::left_normal(offset) * self.angular
    }
}

/// Mass or moment of inertia of a body, which can be infinite.
///
/// This stores both a mass value and its inverse, because the inverse
/// is needed a lot in physics calculations.
#[derive(Clone, Copy, Debug)]
pub enum Mass {
    Finite { mass: f64, inverse: f64 },
    Infinite,
}

impl From<f64> for Mass {
    #[inline]
    fn from(mass: f64) -> Self {
        Mass::Finite {
            mass,
            inverse: 1.0 / mass,
        }
    }
}

impl Mass {
    /// Get the inverse of the mass, which is zero if the mass is infinite.
    #[inline]
    pub fn inv(&self) -> f64 {
        match self {
            Mass::Finite { inverse, .. } => *inverse,
            Mass::Infinite => 0.0,
        }
    }

    /// Get the mass value, which is `f64::INFINITY` if the mass is infinite.
    #[inline]
    pub fn get(&self) -> f64 {
        match self {
            Mass::Finite { mass, .. } => *mass,
            Mass::Infinite => f64::INFINITY,
        }
    }
}

/// Surface properties determining how a body responds to collisions.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// How much energy is preserved in collisions (0 = none, 1 = all).
    pub restitution: f64,
    /// Resistance to tangential motion while surfaces are sticking.
    /// By convention at least as large as `dynamic_friction`.
    pub static_friction: f64,
    /// Resistance to tangential motion while surfaces are sliding.
    pub dynamic_friction: f64,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            restitution: 1.0,
            static_friction: 0.6,
            dynamic_friction: 0.4,
        }
    }
}

impl Material {
    /// Restitution of a collision between bodies with this and the other material.
    ///
    /// Combined as the minimum of the two, so the less bouncy surface
    /// wins. Chosen for predictable behavior, not derived from physics.
    pub fn restitution_with(&self, other: &Material) -> f64 {
        self.restitution.min(other.restitution)
    }

    /// Static friction between this and the other material, combined as the maximum.
    pub fn static_friction_with(&self, other: &Material) -> f64 {
        self.static_friction.max(other.static_friction)
    }

    /// Dynamic friction between this and the other material, combined as the maximum.
    pub fn dynamic_friction_with(&self, other: &Material) -> f64 {
        self.dynamic_friction.max(other.dynamic_friction)
    }
}

/// The physical shape of a body, in local space.
#[derive(Clone, Debug)]
pub enum Shape {
    Circle { radius: f64 },
    Polygon { vertices: Vec<Vec2> },
}

/// Cached world-space geometry, rebuilt only when the transform has changed.
#[derive(Clone, Debug, Default)]
struct GeometryCache {
    version: u64,
    aabb: Option<AABB>,
    centroid: Vec2,
    world_radius: f64,
    world_vertices: Vec<Vec2>,
}

/// A rigid body that can collide with other bodies and respond to impulses.
///
/// Bodies own their transform (position, rotation, scale). World-space
/// geometry such as the bounding box is cached and lazily rebuilt by
/// [`refresh`][Self::refresh], which the physics step calls after moving
/// bodies; callers that mutate transforms between steps do not need to
/// call it themselves.
#[derive(Clone, Debug)]
pub struct Body {
    position: Vec2,
    rotation: f64,
    scale: Vec2,
    transform_version: u64,

    pub velocity: Velocity,
    mass: f64,
    inertia: f64,
    pub material: Material,
    shape: Shape,
    is_static: bool,

    /// Prevents collision response from modifying the x position of this body.
    pub lock_x: bool,
    /// Prevents collision response from modifying the y position of this body.
    pub lock_y: bool,
    /// Prevents collision response from modifying the rotation of this body.
    pub lock_rotation: bool,
    /// Trigger bodies generate collision events but no physical response.
    pub is_trigger: bool,
    pub(crate) layer: usize,

    force: Vec2,
    torque: f64,
    impulse: Vec2,
    angular_impulse: f64,

    cache: GeometryCache,
}

impl Body {
    /// Create a dynamic circle body with the given radius.
    pub fn new_circle(radius: f64) -> Result<Self, ShapeConfigurationError> {
        if radius <= 0.0 {
            return Err(ShapeConfigurationError::NonPositiveRadius(radius));
        }
        Ok(Self::with_shape(Shape::Circle { radius }))
    }

    /// Create a dynamic convex polygon body from a local-space vertex ring.
    ///
    /// The ring must have at least 3 vertices and must be convex;
    /// concave input is rejected rather than approximated.
    pub fn new_polygon(vertices: Vec<Vec2>) -> Result<Self, ShapeConfigurationError> {
        if vertices.len() < 3 {
            return Err(ShapeConfigurationError::TooFewVertices(vertices.len()));
        }
        match m::polygon_convexity(&vertices) {
            m::Convexity::Concave => Err(ShapeConfigurationError::ConcavePolygon),
            m::Convexity::Degenerate => Err(ShapeConfigurationError::DegeneratePolygon),
            m::Convexity::Convex => Ok(Self::with_shape(Shape::Polygon { vertices })),
        }
    }

    fn with_shape(shape: Shape) -> Self {
        let mut body = Body {
            position: Vec2::zero(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            transform_version: 1,
            velocity: Velocity::default(),
            mass: 1.0,
            inertia: 1.0,
            material: Material::default(),
            shape,
            is_static: false,
            lock_x: false,
            lock_y: false,
            lock_rotation: false,
            is_trigger: false,
            layer: 0,
            force: Vec2::zero(),
            torque: 0.0,
            impulse: Vec2::zero(),
            angular_impulse: 0.0,
            cache: GeometryCache::default(),
        };
        body.refresh();
        body
    }

    // builders

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.set_position(position);
        self.refresh();
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.set_rotation(rotation);
        self.refresh();
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.set_scale(scale);
        self.refresh();
        self
    }

    pub fn with_velocity(mut self, linear: Vec2) -> Self {
        self.velocity.linear = linear;
        self
    }

    pub fn with_angular_velocity(mut self, angular: f64) -> Self {
        self.velocity.angular = angular;
        self
    }

    /// Set the mass directly. Non-positive values are clamped to the
    /// smallest representable positive mass.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.set_mass(mass);
        self
    }

    /// Compute mass from the world-space area of the shape and a density.
    pub fn with_density(mut self, density: f64) -> Self {
        self.set_mass(self.world_area() * density);
        self
    }

    /// Static bodies never move and report infinite mass and inertia.
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_restitution(mut self, e: f64) -> Self {
        self.material.restitution = e;
        self
    }

    pub fn with_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Set the collision layer index. The index is validated against the
    /// world's layer table when the body is inserted.
    pub fn with_layer(mut self, layer: usize) -> Self {
        self.layer = layer;
        self
    }

    // only the world may reassign layers, after validating the index
    pub(crate) fn set_layer_index(&mut self, layer: usize) {
        self.layer = layer;
    }

    // accessors

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    /// Mass of the body; infinite for static bodies.
    pub fn mass(&self) -> Mass {
        if self.is_static {
            Mass::Infinite
        } else {
            Mass::from(self.mass)
        }
    }

    /// Moment of inertia of the body; infinite for static bodies.
    ///
    /// Recomputed from world-space geometry whenever the transform or
    /// mass changes: `½mr²` for circles, `m(w² + h²)/12` of the bounding
    /// box for polygons.
    pub fn moment_of_inertia(&self) -> Mass {
        if self.is_static {
            Mass::Infinite
        } else {
            Mass::from(self.inertia)
        }
    }

    /// The world-space bounding box as of the last [`refresh`][Self::refresh].
    pub fn bounding_box(&self) -> AABB {
        // the cache is populated at construction, so this cannot be None
        self.cache.aabb.unwrap_or(AABB {
            min: self.position,
            max: self.position,
        })
    }

    /// The world-space centroid: the position for circles,
    /// the vertex average for polygons.
    pub fn centroid(&self) -> Vec2 {
        self.cache.centroid
    }

    /// The world-space radius of a circle body, accounting for scale;
    /// zero for polygons.
    pub fn world_radius(&self) -> f64 {
        self.cache.world_radius
    }

    /// The world-space vertices of a polygon body; empty for circles.
    pub fn world_vertices(&self) -> &[Vec2] {
        &self.cache.world_vertices
    }

    /// World-space area of the shape.
    pub fn world_area(&self) -> f64 {
        match self.shape {
            Shape::Circle { .. } => {
                std::f64::consts::PI * self.cache.world_radius * self.cache.world_radius
            }
            Shape::Polygon { .. } => {
                let verts = &self.cache.world_vertices;
                let mut doubled = 0.0;
                for (i, v) in verts.iter().enumerate() {
                    let next = verts[(i + 1) % verts.len()];
                    doubled += v.wedge(next).xy;
                }
                doubled.abs() / 2.0
            }
        }
    }

    // transform mutation

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.transform_version += 1;
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
        self.transform_version += 1;
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.transform_version += 1;
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.transform_version += 1;
    }

    /// Set the mass, clamping non-positive values to the smallest
    /// representable positive mass so the invariant `mass > 0` holds.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = if mass > 0.0 { mass } else { f64::MIN_POSITIVE };
        self.update_inertia();
    }

    // forces

    /// Add to the persistent force accumulator, applied every substep.
    ///
    /// Accumulators are stored pre-divided by mass: the value is a change
    /// in velocity per second. Persistent forces are caller-managed and
    /// are not cleared by the engine; see [`clear_forces`][Self::clear_forces].
    /// No-op on static bodies.
    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_static {
            return;
        }
        self.force += force;
    }

    /// Add to the one-shot impulse accumulator, consumed by the next
    /// integration. Pre-divided by mass: the value is a change in velocity.
    /// No-op on static bodies.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.is_static {
            return;
        }
        self.impulse += impulse;
    }

    /// Add to the persistent torque accumulator, in angular velocity per
    /// second. No-op on static bodies.
    pub fn apply_torque(&mut self, torque: f64) {
        if self.is_static {
            return;
        }
        self.torque += torque;
    }

    /// Add to the one-shot angular impulse accumulator, consumed by the
    /// next integration. No-op on static bodies.
    pub fn apply_angular_impulse(&mut self, impulse: f64) {
        if self.is_static {
            return;
        }
        self.angular_impulse += impulse;
    }

    /// Clear the persistent force and torque accumulators.
    pub fn clear_forces(&mut self) {
        self.force = Vec2::zero();
        self.torque = 0.0;
    }

    /// Advance velocity and pose by one substep.
    ///
    /// Lock flags mask the corresponding force and impulse components.
    /// One-shot impulses are consumed and reset; persistent forces are not.
    /// No-op on static bodies.
    pub fn integrate(&mut self, dt: f64) {
        if self.is_static {
            return;
        }

        let mask = Vec2::new(
            if self.lock_x { 0.0 } else { 1.0 },
            if self.lock_y { 0.0 } else { 1.0 },
        );
        self.velocity.linear += (self.force * dt + self.impulse) * mask;
        if !self.lock_rotation {
            self.velocity.angular += self.torque * dt + self.angular_impulse;
        }
        self.impulse = Vec2::zero();
        self.angular_impulse = 0.0;

        self.position += self.velocity.linear * dt;
        self.rotation += self.velocity.angular * dt;
        self.transform_version += 1;
    }

    /// Rebuild cached world-space geometry (bounding box, centroid,
    /// vertices or radius) and the moment of inertia if the transform
    /// has changed since the last call.
    pub fn refresh(&mut self) {
        if self.cache.version == self.transform_version {
            return;
        }

        match &self.shape {
            Shape::Circle { radius } => {
                // scale is applied before rotation, so the transformed local
                // x axis determines the effective radius
                let world_radius = radius * self.scale.x.abs();
                self.cache.world_radius = world_radius;
                self.cache.centroid = self.position;
                self.cache.aabb = Some(AABB::centered(self.position, world_radius, world_radius));
            }
            Shape::Polygon { vertices } => {
                let rotor = Rotor2::from_angle(self.rotation);
                let mut world = std::mem::take(&mut self.cache.world_vertices);
                world.clear();
                world.extend(
                    vertices
                        .iter()
                        .map(|v| self.position + rotor * (*v * self.scale)),
                );
                let mut centroid = Vec2::zero();
                for v in &world {
                    centroid += *v;
                }
                centroid /= world.len() as f64;
                self.cache.aabb = Some(AABB::from_points(&world));
                self.cache.centroid = centroid;
                self.cache.world_vertices = world;
            }
        }
        self.cache.version = self.transform_version;
        self.update_inertia();
    }

    fn update_inertia(&mut self) {
        if self.is_static {
            return;
        }
        self.inertia = match self.shape {
            Shape::Circle { .. } => {
                0.5 * self.mass * self.cache.world_radius * self.cache.world_radius
            }
            Shape::Polygon { .. } => {
                let bb = self.bounding_box();
                let (w, h) = (bb.width(), bb.height());
                self.mass * (w * w + h * h) / 12.0
            }
        }
        .max(f64::MIN_POSITIVE);
    }
}
