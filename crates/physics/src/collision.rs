//! Contact detection and response between dynamic bodies and static planes.

use glam::Vec3;

use crate::shapes::ColliderShape;
use crate::types::{BodyInertia, BodyVelocity, Material, Pose};

/// Penetration allowed before positions are corrected.
const PENETRATION_SLOP: f32 = 0.005;
/// Fraction of the remaining penetration removed per step.
const POSITION_CORRECTION: f32 = 0.8;

/// Contact information for collision response
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Deepest point of the body, in world space
    pub point: Vec3,
    /// Plane normal, pointing out of the static object
    pub normal: Vec3,
    /// Penetration depth
    pub depth: f32,
}

/// World-space plane of a static plane collider.
#[must_use]
pub fn world_plane(pose: &Pose, normal: Vec3, offset: f32) -> (Vec3, f32) {
    let world_normal = (pose.orientation * normal).normalize_or_zero();
    (world_normal, offset + world_normal.dot(pose.position))
}

/// Detect a contact between a dynamic body and a world-space plane.
#[must_use]
pub fn detect_plane_contact(
    shape: &ColliderShape,
    pose: &Pose,
    plane_normal: Vec3,
    plane_offset: f32,
) -> Option<Contact> {
    let distance = pose.position.dot(plane_normal) - plane_offset;
    let extent = shape.support_extent(pose.orientation, -plane_normal);
    if !extent.is_finite() || distance >= extent {
        return None;
    }
    Some(Contact {
        point: pose.position - plane_normal * extent,
        normal: plane_normal,
        depth: extent - distance,
    })
}

/// Resolve a body/plane contact with a restitution impulse, Coulomb friction and
/// positional correction.
pub fn resolve_plane_contact(
    pose: &mut Pose,
    velocity: &mut BodyVelocity,
    inertia: &BodyInertia,
    contact: &Contact,
    material: &Material,
) {
    if inertia.is_kinematic() {
        return;
    }

    let velocity_along_normal = velocity.linear.dot(contact.normal);
    if velocity_along_normal < 0.0 {
        let normal_impulse = -(1.0 + material.restitution) * velocity_along_normal;
        velocity.linear += contact.normal * normal_impulse;

        let tangent_velocity = velocity.linear - contact.normal * velocity.linear.dot(contact.normal);
        let tangent_speed = tangent_velocity.length();
        if tangent_speed > 1e-4 {
            let friction = (material.friction * normal_impulse).min(tangent_speed);
            velocity.linear -= tangent_velocity / tangent_speed * friction;
        }
        velocity.angular *= 1.0 - material.friction * 0.1;
    }

    if contact.depth > PENETRATION_SLOP {
        pose.position += contact.normal * ((contact.depth - PENETRATION_SLOP) * POSITION_CORRECTION);
    }
}
