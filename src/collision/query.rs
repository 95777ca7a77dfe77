//! Geometric queries against individual bodies, independent of the
//! step loop.

use crate::body::{Body, Shape};
use crate::math::{self as m, Vec2};

/// Whether a world-space point lies inside a body's shape.
///
/// Polygon membership uses the even-odd rule: a ray from a point known
/// to be outside the bounding box crosses the boundary an odd number of
/// times exactly when the point is inside.
pub fn point_body_bool(point: Vec2, body: &Body) -> bool {
    match body.shape() {
        Shape::Circle { .. } => {
            let radius = body.world_radius();
            (point - body.centroid()).mag_sq() <= radius * radius
        }
        Shape::Polygon { .. } => {
            let vertices = body.world_vertices();
            let bounds = body.bounding_box();
            if point.x < bounds.min.x
                || point.x > bounds.max.x
                || point.y < bounds.min.y
                || point.y > bounds.max.y
            {
                return false;
            }
            let outside = bounds.min - Vec2::new(1.0, 0.0);
            let len = vertices.len();
            let mut crossings = 0;
            for i in 0..len {
                if m::segments_intersect(outside, point, vertices[i], vertices[(i + 1) % len]) {
                    crossings += 1;
                }
            }
            crossings % 2 == 1
        }
    }
}

/// The points where the segment `a`-`b` crosses a circle's boundary,
/// in order of distance from `a`. Empty when the segment misses or
/// lies entirely inside.
pub fn segment_circle_intersections(a: Vec2, b: Vec2, center: Vec2, radius: f64) -> Vec<Vec2> {
    let direction = b - a;
    let offset = a - center;

    // |offset + t * direction|² = radius², solved for t in [0, 1]
    let qa = direction.mag_sq();
    let qb = 2.0 * offset.dot(direction);
    let qc = offset.mag_sq() - radius * radius;
    if qa < f64::EPSILON {
        return Vec::new();
    }
    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return Vec::new();
    }
    let sqrt_d = discriminant.sqrt();
    let t1 = (-qb - sqrt_d) / (2.0 * qa);
    let t2 = (-qb + sqrt_d) / (2.0 * qa);

    let mut points = Vec::new();
    if (0.0..=1.0).contains(&t1) {
        points.push(a + t1 * direction);
    }
    // a tangent hit is a single point
    if (0.0..=1.0).contains(&t2) && sqrt_d > f64::EPSILON {
        points.push(a + t2 * direction);
    }
    points
}
