use glam::{Quat, Vec3};

use crate::error::PhysicsError;
use crate::types::BodyInertia;

/// Collision geometry, expressed in the local frame of the owning body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    Ellipsoid { radii: Vec3 },
    /// Cylinder aligned with the local Y axis.
    Cylinder { radius: f32, half_height: f32 },
    /// Half-space `dot(p, normal) <= offset`; only valid for statics.
    Plane { normal: Vec3, offset: f32 },
}

impl ColliderShape {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Box { .. } => "box",
            Self::Ellipsoid { .. } => "ellipsoid",
            Self::Cylinder { .. } => "cylinder",
            Self::Plane { .. } => "plane",
        }
    }

    /// Solid-body inertia for the given mass.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidMass`] for non-positive or non-finite masses and
    /// [`PhysicsError::UnboundedShape`] for planes.
    pub fn inertia(&self, mass: f32) -> Result<BodyInertia, PhysicsError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(PhysicsError::InvalidMass(mass));
        }
        let diagonal = match *self {
            Self::Sphere { radius } => Vec3::splat(0.4 * mass * radius * radius),
            Self::Box { half_extents: h } => {
                let h2 = h * h;
                Vec3::new(h2.y + h2.z, h2.x + h2.z, h2.x + h2.y) * (mass / 3.0)
            }
            Self::Ellipsoid { radii: r } => {
                let r2 = r * r;
                Vec3::new(r2.y + r2.z, r2.x + r2.z, r2.x + r2.y) * (mass / 5.0)
            }
            Self::Cylinder {
                radius,
                half_height,
            } => {
                let height = 2.0 * half_height;
                let side = mass * (3.0 * radius * radius + height * height) / 12.0;
                Vec3::new(side, 0.5 * mass * radius * radius, side)
            }
            Self::Plane { .. } => return Err(PhysicsError::UnboundedShape(self.name())),
        };
        Ok(BodyInertia {
            inverse_mass: 1.0 / mass,
            inverse_inertia: Vec3::new(invert(diagonal.x), invert(diagonal.y), invert(diagonal.z)),
        })
    }

    /// Distance from the shape's origin to its furthest point along `direction`.
    ///
    /// `direction` is a unit vector in world space; `orientation` rotates the shape
    /// into world space. Planes have no finite extent and return `f32::INFINITY`.
    #[must_use]
    pub fn support_extent(&self, orientation: Quat, direction: Vec3) -> f32 {
        let local = orientation.inverse() * direction;
        match *self {
            Self::Sphere { radius } => radius,
            Self::Box { half_extents } => local.abs().dot(half_extents),
            Self::Ellipsoid { radii } => (local * radii).length(),
            Self::Cylinder {
                radius,
                half_height,
            } => {
                let along_axis = local.y.abs();
                let across = (1.0 - along_axis * along_axis).max(0.0).sqrt();
                radius * across + half_height * along_axis
            }
            Self::Plane { .. } => f32::INFINITY,
        }
    }
}

fn invert(moment: f32) -> f32 {
    if moment > 0.0 {
        1.0 / moment
    } else {
        0.0
    }
}
