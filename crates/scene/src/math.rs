//! Rotation utilities shared by transforms, the encoder and the camera.
//!
//! Quaternions are the authoritative rotation representation. Euler angles exist only
//! because the raymarching shader consumes them: `x` is pitch, `y` is yaw and `z` is
//! roll, in degrees, and a rotation is composed as `Ry(yaw) · Rx(pitch) · Rz(roll)`.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

/// `|sin(pitch)| / 2` above which the conversion snaps to a pole.
pub const EULER_POLE_THRESHOLD: f32 = 0.4995;

/// Wraps an angle in degrees into `[0, 360)`. Never returns `-0.0`.
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        // rem_euclid keeps the sign of -0.0; adding +0.0 clears it
        wrapped + 0.0
    }
}

/// Converts a rotation to Euler angles in degrees, each wrapped into `[0, 360)`.
///
/// Near the poles (`|wx − yz| > 0.4995·|q|²`) yaw and roll are degenerate; the whole
/// heading is folded into yaw and roll is reported as zero, so a rotation drifting
/// through the pole does not flip between equivalent triples from frame to frame.
#[must_use]
pub fn quat_to_euler_degrees(q: Quat) -> Vec3 {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    let unit = x * x + y * y + z * z + w * w;
    let test = x * w - y * z;

    let (pitch, yaw, roll) = if test > EULER_POLE_THRESHOLD * unit {
        (FRAC_PI_2, 2.0 * y.atan2(x), 0.0)
    } else if test < -EULER_POLE_THRESHOLD * unit {
        (-FRAC_PI_2, -2.0 * y.atan2(x), 0.0)
    } else {
        (
            (2.0 * test / unit).clamp(-1.0, 1.0).asin(),
            (2.0 * (x * z + w * y)).atan2(unit - 2.0 * (x * x + y * y)),
            (2.0 * (x * y + w * z)).atan2(unit - 2.0 * (x * x + z * z)),
        )
    };

    Vec3::new(
        wrap_degrees(pitch.to_degrees()),
        wrap_degrees(yaw.to_degrees()),
        wrap_degrees(roll.to_degrees()),
    )
}

/// Inverse of [`quat_to_euler_degrees`].
#[must_use]
pub fn euler_degrees_to_quat(euler: Vec3) -> Quat {
    let radians = euler * (std::f32::consts::PI / 180.0);
    Quat::from_rotation_y(radians.y) * Quat::from_rotation_x(radians.x) * Quat::from_rotation_z(radians.z)
}

/// Applies `delta` on top of `rotation` in world space and renormalises.
#[must_use]
pub fn compose(rotation: Quat, delta: Quat) -> Quat {
    (delta * rotation).normalize()
}

/// Whether two quaternions describe the same rotation (`q` and `−q` are equal).
#[must_use]
pub fn same_rotation(a: Quat, b: Quat, tolerance: f32) -> bool {
    a.normalize().dot(b.normalize()).abs() >= 1.0 - tolerance
}

/// Whether `q` has unit length within `tolerance`.
#[must_use]
pub fn is_unit(q: Quat, tolerance: f32) -> bool {
    (q.length() - 1.0).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_unit_quat(rng: &fastrand::Rng) -> Quat {
        loop {
            let q = Quat::from_xyzw(
                rng.f32() * 2.0 - 1.0,
                rng.f32() * 2.0 - 1.0,
                rng.f32() * 2.0 - 1.0,
                rng.f32() * 2.0 - 1.0,
            );
            if q.length_squared() > 1e-3 {
                return q.normalize();
            }
        }
    }

    #[test]
    fn identity_is_all_zero() {
        assert_eq!(quat_to_euler_degrees(Quat::IDENTITY), Vec3::ZERO);
    }

    #[test]
    fn negative_angles_wrap_into_range() {
        let euler = quat_to_euler_degrees(Quat::from_rotation_y(-90f32.to_radians()));
        assert!((euler.y - 270.0).abs() < 1e-3, "{euler:?}");
        assert!(wrap_degrees(-1e-9) < 360.0);
        assert!((wrap_degrees(725.0) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn signed_zero_encodes_like_zero() {
        assert_eq!(wrap_degrees(-0.0).to_bits(), 0.0_f32.to_bits());
        assert_eq!(wrap_degrees(-360.0).to_bits(), 0.0_f32.to_bits());

        let signed = quat_to_euler_degrees(Quat::from_xyzw(-0.0, -0.0, -0.0, 1.0));
        for angle in signed.to_array() {
            assert_eq!(angle.to_bits(), 0.0_f32.to_bits(), "{signed}");
        }
    }

    #[test]
    fn single_axis_rotations_land_on_their_component() {
        let pitch = quat_to_euler_degrees(Quat::from_rotation_x(30f32.to_radians()));
        let yaw = quat_to_euler_degrees(Quat::from_rotation_y(45f32.to_radians()));
        let roll = quat_to_euler_degrees(Quat::from_rotation_z(60f32.to_radians()));
        assert!((pitch - Vec3::new(30.0, 0.0, 0.0)).abs().max_element() < 1e-3);
        assert!((yaw - Vec3::new(0.0, 45.0, 0.0)).abs().max_element() < 1e-3);
        assert!((roll - Vec3::new(0.0, 0.0, 60.0)).abs().max_element() < 1e-3);
    }

    #[test]
    fn round_trip_away_from_poles() {
        let rng = fastrand::Rng::with_seed(0x5eed);
        let mut checked = 0;
        while checked < 500 {
            let q = random_unit_quat(&rng);
            if (q.x * q.w - q.y * q.z).abs() >= EULER_POLE_THRESHOLD {
                continue;
            }
            let back = euler_degrees_to_quat(quat_to_euler_degrees(q));
            assert!(same_rotation(q, back, 1e-4), "q={q:?} back={back:?}");
            checked += 1;
        }
    }

    #[test]
    fn poles_fold_heading_into_yaw() {
        for pitch in [90.0_f32, -90.0] {
            let q = euler_degrees_to_quat(Vec3::new(pitch, 30.0, 20.0));
            let euler = quat_to_euler_degrees(q);
            assert!((euler.x - wrap_degrees(pitch)).abs() < 1e-3, "{euler:?}");
            assert!(euler.z.abs() < 1e-6, "{euler:?}");
            assert!(same_rotation(q, euler_degrees_to_quat(euler), 1e-4));
        }
    }

    #[test]
    fn composition_keeps_unit_norm() {
        let rng = fastrand::Rng::with_seed(7);
        let mut rotation = Quat::IDENTITY;
        for _ in 0..10_000 {
            let delta = Quat::from_axis_angle(
                Vec3::new(rng.f32() - 0.5, rng.f32() - 0.5, rng.f32() - 0.5)
                    .try_normalize()
                    .unwrap_or(Vec3::Y),
                rng.f32() * 0.2,
            );
            rotation = compose(rotation, delta);
            assert!(is_unit(rotation, 1e-5));
        }
    }
}
