//! Collision resolution: positional depenetration followed by a
//! sequential impulse velocity response with restitution and Coulomb
//! friction.

use crate::body::Body;
use crate::collision::Collision;
use crate::math::{self as m, Vec2};

// below this squared magnitude the tangential velocity has no usable
// direction and friction is skipped
const TANGENT_EPSILON_SQ: f64 = 1e-12;

/// Translation offsets that separate an overlapping pair, indexed like
/// `collision.bodies`.
///
/// A static body never moves; its partner absorbs the full depth.
/// Between two dynamic bodies the depth is split evenly, except where
/// an axis lock redirects one body's share onto its partner.
pub(crate) fn positional_correction(
    collision: &Collision,
    body1: &Body,
    body2: &Body,
) -> [Vec2; 2] {
    let push = *collision.normal * collision.depth;
    if body1.is_static() {
        return [Vec2::zero(), -push];
    }
    if body2.is_static() {
        return [push, Vec2::zero()];
    }

    let mut offset1 = push / 2.0;
    let mut offset2 = -push / 2.0;
    if body1.lock_x && body2.lock_x {
        offset1.x = 0.0;
        offset2.x = 0.0;
    } else if body1.lock_x {
        offset1.x = 0.0;
        offset2.x *= 2.0;
    } else if body2.lock_x {
        offset1.x *= 2.0;
        offset2.x = 0.0;
    }
    if body1.lock_y && body2.lock_y {
        offset1.y = 0.0;
        offset2.y = 0.0;
    } else if body1.lock_y {
        offset1.y = 0.0;
        offset2.y *= 2.0;
    } else if body2.lock_y {
        offset1.y *= 2.0;
        offset2.y = 0.0;
    }
    [offset1, offset2]
}

/// Compute and deposit collision impulses for every contact point.
///
/// Impulses land in the bodies' one-shot accumulators and take effect
/// on the next integration. The restitution used is the lower of the
/// two materials', friction coefficients the higher.
pub(crate) fn velocity_response(collision: &Collision, body1: &mut Body, body2: &mut Body) {
    let contact_count = collision.contacts.len();
    if contact_count == 0 {
        return;
    }
    let normal = *collision.normal;

    let restitution = body1.material.restitution_with(&body2.material);
    let static_friction = body1.material.static_friction_with(&body2.material);
    let dynamic_friction = body1.material.dynamic_friction_with(&body2.material);

    let inv_mass1 = body1.mass().inv();
    let inv_mass2 = body2.mass().inv();
    let inv_inertia1 = body1.moment_of_inertia().inv();
    let inv_inertia2 = body2.moment_of_inertia().inv();
    // shared inverse mass is split evenly between contact points
    let inv_mass_term = (inv_mass1 + inv_mass2) / contact_count as f64;

    let centroid1 = body1.centroid();
    let centroid2 = body2.centroid();

    for contact in collision.contacts.iter() {
        let arm1 = contact - centroid1;
        let arm2 = contact - centroid2;
        let arm1_perp = m::left_normal(arm1);
        let arm2_perp = m::left_normal(arm2);

        let relative_vel =
            body1.velocity.point_velocity(arm1) - body2.velocity.point_velocity(arm2);
        let normal_vel = relative_vel.dot(normal);
        // already separating along the normal
        if normal_vel > 0.0 {
            continue;
        }

        let normal_denom = inv_mass_term
            + arm1_perp.dot(normal).powi(2) * inv_inertia1
            + arm2_perp.dot(normal).powi(2) * inv_inertia2;
        if normal_denom <= f64::EPSILON {
            continue;
        }
        let j = -(1.0 + restitution) * normal_vel / normal_denom;
        let impulse = normal * j;

        body1.apply_impulse(impulse * inv_mass1);
        body2.apply_impulse(-impulse * inv_mass2);
        body1.apply_angular_impulse(arm1.wedge(impulse).xy * inv_inertia1);
        body2.apply_angular_impulse(-arm2.wedge(impulse).xy * inv_inertia2);

        let tangent_vel = relative_vel - normal * normal_vel;
        if tangent_vel.mag_sq() < TANGENT_EPSILON_SQ {
            continue;
        }
        let tangent = tangent_vel.normalized();

        let tangent_denom = inv_mass_term
            + arm1_perp.dot(tangent).powi(2) * inv_inertia1
            + arm2_perp.dot(tangent).powi(2) * inv_inertia2;
        if tangent_denom <= f64::EPSILON {
            continue;
        }
        let jt = -relative_vel.dot(tangent) / tangent_denom;
        // static friction holds until the required impulse exceeds the
        // cone, then kinetic friction takes over
        let jt = if jt.abs() <= j * static_friction {
            jt
        } else {
            -j * dynamic_friction
        };
        let friction_impulse = tangent * jt;

        body1.apply_impulse(friction_impulse * inv_mass1);
        body2.apply_impulse(-friction_impulse * inv_mass2);
        body1.apply_angular_impulse(arm1.wedge(friction_impulse).xy * inv_inertia1);
        body2.apply_angular_impulse(-arm2.wedge(friction_impulse).xy * inv_inertia2);
    }
}
