//! Narrow phase: exact intersection tests between shape pairs via the
//! separating axis theorem, plus contact point extraction.

use crate::body::{Body, Shape};
use crate::collision::Contacts;
use crate::math::{self as m, Unit, Vec2};

/// Result of an intersection test, before body identity is attached.
#[derive(Clone, Copy, Debug)]
pub struct Penetration {
    /// Depth of overlap along the normal, >= 0.
    pub depth: f64,
    /// Unit normal pointing toward the first body of the tested pair.
    pub normal: Unit<Vec2>,
}

// edges shorter than this contribute no separating axis
const DEGENERATE_EDGE: f64 = 1e-12;

/// Test two bodies for intersection.
///
/// Pairs of static bodies are never considered intersecting. The
/// returned normal points from `body2` toward `body1`.
pub fn intersection_check(body1: &Body, body2: &Body) -> Option<Penetration> {
    if body1.is_static() && body2.is_static() {
        return None;
    }
    match (body1.shape(), body2.shape()) {
        (Shape::Circle { .. }, Shape::Circle { .. }) => circle_circle(body1, body2),
        (Shape::Polygon { .. }, Shape::Polygon { .. }) => polygon_polygon(body1, body2),
        (Shape::Circle { .. }, Shape::Polygon { .. }) => circle_polygon(body1, body2),
        (Shape::Polygon { .. }, Shape::Circle { .. }) => {
            circle_polygon(body2, body1).map(|pen| Penetration {
                depth: pen.depth,
                normal: -pen.normal,
            })
        }
    }
}

fn circle_circle(body1: &Body, body2: &Body) -> Option<Penetration> {
    let separation = body1.centroid() - body2.centroid();
    let depth = body1.world_radius() + body2.world_radius() - separation.mag();
    if depth < 0.0 {
        return None;
    }
    // concentric circles have no meaningful direction; pick the x axis
    let normal = if separation.mag_sq() < DEGENERATE_EDGE {
        Unit::unit_x()
    } else {
        Unit::new_normalize(separation)
    };
    Some(Penetration { depth, normal })
}

/// The outward-facing axis candidates of a polygon: the normalized
/// perpendicular of each non-degenerate edge.
fn edge_normals(vertices: &[Vec2]) -> impl Iterator<Item = Unit<Vec2>> + '_ {
    let len = vertices.len();
    (0..len).filter_map(move |i| {
        let edge = vertices[(i + 1) % len] - vertices[i];
        if edge.mag_sq() < DEGENERATE_EDGE {
            None
        } else {
            Some(Unit::new_normalize(m::right_normal(edge)))
        }
    })
}

/// Flip the minimum penetration axis so it points from `from` toward `to`.
fn orient_toward(axis: Unit<Vec2>, from: Vec2, to: Vec2) -> Unit<Vec2> {
    if axis.dot(to - from) < 0.0 {
        -axis
    } else {
        axis
    }
}

fn polygon_polygon(body1: &Body, body2: &Body) -> Option<Penetration> {
    let verts1 = body1.world_vertices();
    let verts2 = body2.world_vertices();

    let mut min_depth = f64::MAX;
    // a shape degenerate enough to offer no axis (e.g. scaled to a
    // point) cannot report a collision
    let mut min_axis: Option<Unit<Vec2>> = None;
    for axis in edge_normals(verts1).chain(edge_normals(verts2)) {
        let (min1, max1) = m::project_onto_axis(verts1, axis);
        let (min2, max2) = m::project_onto_axis(verts2, axis);
        if min1 >= max2 || min2 >= max1 {
            return None;
        }
        let depth = (max2 - min1).min(max1 - min2);
        if depth < min_depth {
            min_depth = depth;
            min_axis = Some(axis);
        }
    }

    Some(Penetration {
        depth: min_depth,
        normal: orient_toward(min_axis?, body2.centroid(), body1.centroid()),
    })
}

/// SAT with the polygon's edge normals plus the axis from the circle
/// center to its closest polygon vertex (which separates vertex-region
/// configurations the edge normals miss).
fn circle_polygon(circle: &Body, polygon: &Body) -> Option<Penetration> {
    let center = circle.centroid();
    let radius = circle.world_radius();
    let verts = polygon.world_vertices();

    let closest = m::closest_vertex(center, verts);
    let to_closest = closest - center;
    let vertex_axis = if to_closest.mag_sq() < DEGENERATE_EDGE {
        None
    } else {
        Some(Unit::new_normalize(to_closest))
    };

    let mut min_depth = f64::MAX;
    let mut min_axis: Option<Unit<Vec2>> = None;
    for axis in edge_normals(verts).chain(vertex_axis) {
        let (min_p, max_p) = m::project_onto_axis(verts, axis);
        let c = center.dot(*axis);
        let (min_c, max_c) = (c - radius, c + radius);
        if min_p >= max_c || min_c >= max_p {
            return None;
        }
        let depth = (max_c - min_p).min(max_p - min_c);
        if depth < min_depth {
            min_depth = depth;
            min_axis = Some(axis);
        }
    }

    Some(Penetration {
        depth: min_depth,
        normal: orient_toward(min_axis?, polygon.centroid(), center),
    })
}

// two vertices closer together than this count as one contact
const CONTACT_TOLERANCE: f64 = 0.1;

/// Find the world-space contact points of an intersecting pair.
///
/// `normal` must point from `body2` toward `body1`, as returned by
/// [`intersection_check`].
pub fn find_contacts(body1: &Body, body2: &Body, normal: Unit<Vec2>) -> Contacts {
    match (body1.shape(), body2.shape()) {
        (Shape::Circle { .. }, _) => circle_contact(body1, body2, normal),
        (_, Shape::Circle { .. }) => circle_contact(body2, body1, normal),
        _ => polygon_polygon_contacts(body1, body2),
    }
}

/// A circle touches anything at a single point: its center pushed
/// along the normal toward the other body.
fn circle_contact(circle: &Body, other: &Body, normal: Unit<Vec2>) -> Contacts {
    let center = circle.centroid();
    let toward_other = (other.centroid() - center).dot(*normal);
    let orientation = if toward_other < 0.0 { -1.0 } else { 1.0 };
    Contacts::One(center + *normal * (orientation * circle.world_radius()))
}

/// Deepest-vertex heuristic for polygon pairs: the contact points are
/// the vertices of either polygon at minimum distance to one of the
/// other polygon's edges, with near-ties admitting a second point.
fn polygon_polygon_contacts(body1: &Body, body2: &Body) -> Contacts {
    let mut min_distance = f64::MAX;
    let mut contact1: Option<Vec2> = None;
    let mut contact2: Option<Vec2> = None;

    let mut scan = |vertices: &[Vec2], edges_of: &[Vec2]| {
        let len = edges_of.len();
        for &vertex in vertices {
            for i in 0..len {
                let distance =
                    m::point_segment_distance(vertex, edges_of[i], edges_of[(i + 1) % len]);
                if m::nearly_equal(distance, min_distance, CONTACT_TOLERANCE) {
                    match contact1 {
                        Some(c1) if !m::nearly_equal_vec2(vertex, c1, CONTACT_TOLERANCE) => {
                            contact2 = Some(vertex);
                        }
                        _ => {}
                    }
                } else if distance < min_distance {
                    min_distance = distance;
                    contact1 = Some(vertex);
                    contact2 = None;
                }
            }
        }
    };
    scan(body1.world_vertices(), body2.world_vertices());
    scan(body2.world_vertices(), body1.world_vertices());

    match (contact1, contact2) {
        (Some(c1), Some(c2)) => Contacts::Two(c1, c2),
        (Some(c1), None) => Contacts::One(c1),
        _ => Contacts::Zero,
    }
}
