//! Types, aliases and helper operations for doing math with `ultraviolet`.

pub use ultraviolet as uv;

pub type Vec2 = uv::DVec2;
pub type Rotor2 = uv::DRotor2;

/// A wrapper type to indicate a vector should always be normalized.
#[derive(Clone, Copy, Debug)]
pub struct Unit<T>(T);

impl Unit<Vec2> {
    pub fn new_normalize(v: Vec2) -> Self {
        Unit(v.normalized())
    }

    pub const fn new_unchecked(v: Vec2) -> Self {
        Unit(v)
    }

    pub fn unit_x() -> Self {
        Unit(Vec2::unit_x())
    }

    pub fn unit_y() -> Self {
        Unit(Vec2::unit_y())
    }
}

impl std::ops::Mul<Unit<Vec2>> for Rotor2 {
    type Output = Unit<Vec2>;

    fn mul(self, rhs: Unit<Vec2>) -> Self::Output {
        Unit(self * rhs.0)
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Neg for Unit<T>
where
    T: std::ops::Neg,
{
    type Output = Unit<<T as std::ops::Neg>::Output>;

    fn neg(self) -> Self::Output {
        Unit(-self.0)
    }
}

#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

#[inline]
pub fn right_normal(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

#[inline]
pub fn unit_left_normal(u: Unit<Vec2>) -> Unit<Vec2> {
    Unit::new_unchecked(left_normal(*u))
}

/// Whether two scalars are within `accuracy` of each other.
#[inline]
pub fn nearly_equal(a: f64, b: f64, accuracy: f64) -> bool {
    (b - a).abs() < accuracy
}

/// Whether two points are within `accuracy` distance of each other.
#[inline]
pub fn nearly_equal_vec2(a: Vec2, b: Vec2, accuracy: f64) -> bool {
    (b - a).mag_sq() < accuracy * accuracy
}

/// The turn direction of the angle formed by three points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    Collinear,
}

/// Find the turn direction at `q` when walking `p -> q -> r`.
pub fn orientation(p: Vec2, q: Vec2, r: Vec2) -> Orientation {
    let cross = (q - p).wedge(r - q).xy;
    if cross > 0.0 {
        Orientation::CounterClockwise
    } else if cross < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Result of checking a vertex ring for convexity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convexity {
    Convex,
    Concave,
    /// Too many collinear vertices to enclose an area at all.
    Degenerate,
}

/// Classify a cyclic vertex ring as convex, concave or degenerate.
///
/// A ring is convex when every non-collinear turn goes the same way.
pub fn polygon_convexity(vertices: &[Vec2]) -> Convexity {
    let len = vertices.len();
    let mut clockwise = 0;
    let mut counter_clockwise = 0;
    let mut collinear = 0;

    for i in 0..len {
        match orientation(vertices[i], vertices[(i + 1) % len], vertices[(i + 2) % len]) {
            Orientation::Clockwise => clockwise += 1,
            Orientation::CounterClockwise => counter_clockwise += 1,
            Orientation::Collinear => collinear += 1,
        }
    }

    if len - collinear < 3 {
        Convexity::Degenerate
    } else if clockwise > 0 && counter_clockwise > 0 {
        Convexity::Concave
    } else {
        Convexity::Convex
    }
}

/// Project every vertex onto an axis and return the covered interval.
pub fn project_onto_axis(vertices: &[Vec2], axis: Unit<Vec2>) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for v in vertices {
        let p = v.dot(*axis);
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

/// Distance from a point to the closest point on the segment `a`-`b`.
pub fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f64 {
    let seg = b - a;
    let to_point = point - a;
    let len_sq = seg.mag_sq();
    // zero-length segments degrade to point distance
    let t = if len_sq > 0.0 {
        (to_point.dot(seg) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (point - (a + t * seg)).mag()
}

/// The vertex of `vertices` closest to `to`. Panics on an empty slice.
pub fn closest_vertex(to: Vec2, vertices: &[Vec2]) -> Vec2 {
    let mut closest = vertices[0];
    let mut min_dist_sq = (closest - to).mag_sq();
    for v in &vertices[1..] {
        let dist_sq = (*v - to).mag_sq();
        if dist_sq < min_dist_sq {
            min_dist_sq = dist_sq;
            closest = *v;
        }
    }
    closest
}

/// Whether the segments `a0`-`a1` and `b0`-`b1` cross each other.
pub fn segments_intersect(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> bool {
    let o1 = orientation(a0, a1, b0);
    let o2 = orientation(a0, a1, b1);
    let o3 = orientation(b0, b1, a0);
    let o4 = orientation(b0, b1, a1);
    o1 != o2 && o3 != o4
}

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct AABB {
    pub min: Vec2,
    pub max: Vec2,
}

impl AABB {
    /// The smallest box containing every given point. Panics on an empty slice.
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        AABB { min, max }
    }

    /// A box of the given half-extents centered on a point.
    pub fn centered(center: Vec2, half_width: f64, half_height: f64) -> Self {
        let half = Vec2::new(half_width, half_height);
        AABB {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}
