use glam::{Mat4, Quat, Vec3};

use crate::math::{compose, euler_degrees_to_quat, quat_to_euler_degrees};

/// Position, rotation and scale of anything placed in the scene.
///
/// `rotation` is kept normalised: every mutation goes through quaternion composition.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation: rotation.normalize(),
            scale,
        }
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    /// Rotation as pitch/yaw/roll degrees in `[0, 360)`.
    #[must_use]
    pub fn euler_degrees(&self) -> Vec3 {
        quat_to_euler_degrees(self.rotation)
    }

    pub fn set_euler_degrees(&mut self, euler: Vec3) {
        self.rotation = euler_degrees_to_quat(euler).normalize();
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Applies a world-space rotation delta.
    pub fn rotate(&mut self, delta: Quat) {
        self.rotation = compose(self.rotation, delta);
    }

    /// Applies a rotation delta about the transform's own axes.
    pub fn rotate_local(&mut self, delta: Quat) {
        self.rotation = (self.rotation * delta).normalize();
    }

    /// Applies a pitch/yaw/roll delta in degrees.
    pub fn rotate_euler_degrees(&mut self, delta: Vec3) {
        self.rotate(euler_degrees_to_quat(delta));
    }

    /// Local -Z in world space.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Maps a world-space point into this transform's local frame.
    #[must_use]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        (self.rotation.inverse() * (point - self.position)) / self.scale
    }
}
