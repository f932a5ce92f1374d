use glam::{Mat4, Vec3};

use crate::transform::Transform;

/// Index of a camera owned by a [`crate::World`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub(crate) u32);

impl CameraId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Perspective camera looking down its local -Z axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub transform: Transform,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            fov_y_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    /// Camera at `eye` turned towards `target`.
    #[must_use]
    pub fn looking_at(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        let forward = (target - eye).normalize_or_zero();
        let yaw = (-forward.x).atan2(-forward.z);
        let pitch = forward.y.clamp(-1.0, 1.0).asin();
        let mut transform = Transform::from_position(eye);
        transform.set_rotation(glam::Quat::from_rotation_y(yaw) * glam::Quat::from_rotation_x(pitch));
        Self {
            transform,
            aspect,
            ..Self::default()
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.transform.forward()
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.transform.position;
        Mat4::look_to_rh(eye, self.direction(), self.transform.up())
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_points_direction_at_target() {
        let camera = Camera::looking_at(Vec3::new(5.0, 3.0, 8.0), Vec3::new(0.0, 1.0, 0.0), 1.0);
        let expected = (Vec3::new(0.0, 1.0, 0.0) - Vec3::new(5.0, 3.0, 8.0)).normalize();
        assert!((camera.direction() - expected).length() < 1e-5);
    }

    #[test]
    fn view_maps_eye_to_origin() {
        let camera = Camera::looking_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, 1.5);
        let eye = camera.view_matrix().transform_point3(camera.transform.position);
        assert!(eye.length() < 1e-5);
        let ahead = camera
            .view_matrix()
            .transform_point3(camera.transform.position + camera.direction());
        assert!((ahead - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn resize_ignores_zero_height() {
        let mut camera = Camera::default();
        camera.resize(800, 0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        camera.resize(800, 400);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
    }
}
