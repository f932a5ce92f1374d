//! # Physics Integration
//!
//! Semi-implicit Euler integration of body velocities and poses.

use glam::{Quat, Vec3};

use crate::types::{BodyInertia, BodyVelocity, Pose};

/// Add gravity to a body's linear velocity. Kinematic bodies are unaffected.
pub fn integrate_velocity(
    velocity: &mut BodyVelocity,
    inertia: &BodyInertia,
    gravity: Vec3,
    dt: f32,
) {
    if inertia.is_kinematic() {
        return;
    }
    velocity.linear += gravity * dt;
}

/// Advance a pose by the current velocity.
///
/// Orientation follows `q' = q + ½·ω·q·dt` and is renormalised afterwards.
pub fn integrate_pose(pose: &mut Pose, velocity: &BodyVelocity, dt: f32) {
    pose.position += velocity.linear * dt;

    let w = velocity.angular;
    if w.length_squared() > 0.0 {
        let spin = Quat::from_xyzw(w.x, w.y, w.z, 0.0) * pose.orientation;
        pose.orientation = (pose.orientation + spin * (0.5 * dt)).normalize();
    }
}

/// Scale both velocity components by the damping factor.
pub fn apply_damping(velocity: &mut BodyVelocity, damping: f32) {
    velocity.linear *= damping;
    velocity.angular *= damping;
}

/// Angular velocity change produced by an angular impulse, using the world-space
/// inverse inertia `R · I⁻¹ · Rᵀ`.
#[must_use]
pub fn angular_velocity_change(orientation: Quat, inertia: &BodyInertia, impulse: Vec3) -> Vec3 {
    let local = orientation.inverse() * impulse;
    orientation * (inertia.inverse_inertia * local)
}
