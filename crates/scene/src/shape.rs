//! The closed set of SDF shapes and their per-shape formulas.
//!
//! Every table that depends on the shape kind (pool capacities, encoder options,
//! collider construction) is either an exhaustive `match` over [`Shape`] or an array
//! indexed by [`ShapeKind::index`], so adding a kind fails to compile until each of
//! them handles it.

use std::fmt;
use std::str::FromStr;

use glam::{Vec2, Vec3, Vec3Swizzles, Vec4};
use physics::ColliderShape;

use crate::error::SceneError;

/// Shape tag of a primitive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Sphere,
    Box,
    Plane,
    Ellipsoid,
    Torus,
    CappedTorus,
}

impl ShapeKind {
    pub const COUNT: usize = 6;

    pub const ALL: [ShapeKind; Self::COUNT] = [
        Self::Sphere,
        Self::Box,
        Self::Plane,
        Self::Ellipsoid,
        Self::Torus,
        Self::CappedTorus,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Box => "box",
            Self::Plane => "plane",
            Self::Ellipsoid => "ellipsoid",
            Self::Torus => "torus",
            Self::CappedTorus => "capped_torus",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SceneError::InvalidShapeTag(s.to_owned()))
    }
}

/// Shape parameters, in the primitive's local (unscaled) frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    /// Surface `dot(p, normal) = height`.
    Plane { normal: Vec3, height: f32 },
    Ellipsoid { radii: Vec3 },
    /// Ring in the local XZ plane.
    Torus { major_radius: f32, minor_radius: f32 },
    /// Arc of a ring in the local XY plane, spanning `±cap_angle` radians around +Y.
    CappedTorus {
        major_radius: f32,
        minor_radius: f32,
        cap_angle: f32,
    },
}

impl Shape {
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Box { .. } => ShapeKind::Box,
            Self::Plane { .. } => ShapeKind::Plane,
            Self::Ellipsoid { .. } => ShapeKind::Ellipsoid,
            Self::Torus { .. } => ShapeKind::Torus,
            Self::CappedTorus { .. } => ShapeKind::CappedTorus,
        }
    }

    /// Unit-sized stand-in used to fill unclaimed pool slots.
    #[must_use]
    pub fn unit(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Sphere => Self::Sphere { radius: 1.0 },
            ShapeKind::Box => Self::Box {
                half_extents: Vec3::splat(0.5),
            },
            ShapeKind::Plane => Self::Plane {
                normal: Vec3::Y,
                height: 0.0,
            },
            ShapeKind::Ellipsoid => Self::Ellipsoid { radii: Vec3::ONE },
            ShapeKind::Torus => Self::Torus {
                major_radius: 1.0,
                minor_radius: 0.25,
            },
            ShapeKind::CappedTorus => Self::CappedTorus {
                major_radius: 1.0,
                minor_radius: 0.25,
                cap_angle: std::f32::consts::FRAC_PI_2,
            },
        }
    }

    /// The four shader-facing SDF parameters.
    ///
    /// | kind          | x      | y      | z            | w            |
    /// |---------------|--------|--------|--------------|--------------|
    /// | sphere        | radius | 0      | 0            | 0            |
    /// | box           | hx     | hy     | hz           | 0            |
    /// | plane         | nx     | ny     | nz           | height       |
    /// | ellipsoid     | rx     | ry     | rz           | 0            |
    /// | torus         | major  | minor  | 0            | 0            |
    /// | capped torus  | major  | minor  | sin(cap)     | cos(cap)     |
    #[must_use]
    pub fn sdf_options(&self) -> Vec4 {
        match *self {
            Self::Sphere { radius } => Vec4::new(radius, 0.0, 0.0, 0.0),
            Self::Box { half_extents } => half_extents.extend(0.0),
            Self::Plane { normal, height } => normal.extend(height),
            Self::Ellipsoid { radii } => radii.extend(0.0),
            Self::Torus {
                major_radius,
                minor_radius,
            } => Vec4::new(major_radius, minor_radius, 0.0, 0.0),
            Self::CappedTorus {
                major_radius,
                minor_radius,
                cap_angle,
            } => {
                let (sin, cos) = cap_angle.sin_cos();
                Vec4::new(major_radius, minor_radius, sin, cos)
            }
        }
    }

    /// Collision geometry for this shape stretched by `scale`.
    ///
    /// Tori have no matching collider: a full ring becomes the cylinder that encloses
    /// it, a capped ring the box around its whole circle.
    #[must_use]
    pub fn collider(&self, scale: Vec3) -> ColliderShape {
        match *self {
            Self::Sphere { radius } => ColliderShape::Sphere {
                radius: radius * scale.max_element(),
            },
            Self::Box { half_extents } => ColliderShape::Box {
                half_extents: half_extents * scale,
            },
            Self::Plane { normal, height } => ColliderShape::Plane {
                normal: normal.normalize_or_zero(),
                offset: height,
            },
            Self::Ellipsoid { radii } => ColliderShape::Ellipsoid {
                radii: radii * scale,
            },
            Self::Torus {
                major_radius,
                minor_radius,
            } => ColliderShape::Cylinder {
                radius: (major_radius + minor_radius) * scale.x.max(scale.z),
                half_height: minor_radius * scale.y,
            },
            Self::CappedTorus {
                major_radius,
                minor_radius,
                ..
            } => {
                let outer = major_radius + minor_radius;
                ColliderShape::Box {
                    half_extents: Vec3::new(outer, outer, minor_radius) * scale,
                }
            }
        }
    }

    /// Signed distance from a local-space point to the surface.
    #[must_use]
    pub fn distance(&self, p: Vec3) -> f32 {
        match *self {
            Self::Sphere { radius } => p.length() - radius,
            Self::Box { half_extents } => {
                let q = p.abs() - half_extents;
                q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
            }
            Self::Plane { normal, height } => p.dot(normal.normalize_or_zero()) - height,
            Self::Ellipsoid { radii } => {
                let k0 = (p / radii).length();
                let k1 = (p / (radii * radii)).length();
                if k1 == 0.0 {
                    -radii.min_element()
                } else {
                    k0 * (k0 - 1.0) / k1
                }
            }
            Self::Torus {
                major_radius,
                minor_radius,
            } => Vec2::new(p.xz().length() - major_radius, p.y).length() - minor_radius,
            Self::CappedTorus {
                major_radius,
                minor_radius,
                cap_angle,
            } => {
                let (sin, cos) = cap_angle.sin_cos();
                let px = p.x.abs();
                let k = if cos * px > sin * p.y {
                    Vec2::new(px, p.y).dot(Vec2::new(sin, cos))
                } else {
                    Vec2::new(px, p.y).length()
                };
                (p.length_squared() + major_radius * major_radius - 2.0 * major_radius * k)
                    .max(0.0)
                    .sqrt()
                    - minor_radius
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_case_insensitively() {
        assert_eq!("Capped_Torus".parse::<ShapeKind>().unwrap(), ShapeKind::CappedTorus);
        assert!(matches!(
            "cylinder".parse::<ShapeKind>(),
            Err(SceneError::InvalidShapeTag(tag)) if tag == "cylinder"
        ));
    }

    #[test]
    fn indices_follow_all_order() {
        for (i, kind) in ShapeKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(Shape::unit(kind).kind(), kind);
        }
    }

    #[test]
    fn options_follow_the_table() {
        assert_eq!(Shape::Sphere { radius: 2.0 }.sdf_options(), Vec4::new(2.0, 0.0, 0.0, 0.0));
        assert_eq!(
            Shape::Torus {
                major_radius: 3.0,
                minor_radius: 0.5
            }
            .sdf_options(),
            Vec4::new(3.0, 0.5, 0.0, 0.0)
        );
        let capped = Shape::CappedTorus {
            major_radius: 1.0,
            minor_radius: 0.2,
            cap_angle: std::f32::consts::FRAC_PI_2,
        }
        .sdf_options();
        assert!((capped.z - 1.0).abs() < 1e-6 && capped.w.abs() < 1e-6);
    }

    #[test]
    fn distances_on_known_points() {
        let sphere = Shape::Sphere { radius: 1.0 };
        assert!((sphere.distance(Vec3::new(3.0, 0.0, 0.0)) - 2.0).abs() < 1e-6);

        let cube = Shape::Box {
            half_extents: Vec3::ONE,
        };
        assert!((cube.distance(Vec3::ZERO) + 1.0).abs() < 1e-6);
        assert!((cube.distance(Vec3::new(2.0, 0.0, 0.0)) - 1.0).abs() < 1e-6);

        let ground = Shape::Plane {
            normal: Vec3::Y,
            height: 1.0,
        };
        assert!((ground.distance(Vec3::new(5.0, 3.0, -2.0)) - 2.0).abs() < 1e-6);

        let ring = Shape::Torus {
            major_radius: 2.0,
            minor_radius: 0.5,
        };
        assert!(ring.distance(Vec3::new(2.0, 0.0, 0.0)) < 0.0);
        assert!((ring.distance(Vec3::ZERO) - 1.5).abs() < 1e-6);

        let egg = Shape::Ellipsoid {
            radii: Vec3::new(2.0, 1.0, 1.0),
        };
        assert!(egg.distance(Vec3::new(2.0, 0.0, 0.0)).abs() < 1e-5);
    }

    #[test]
    fn capped_torus_is_open_below() {
        let arc = Shape::CappedTorus {
            major_radius: 1.0,
            minor_radius: 0.1,
            cap_angle: std::f32::consts::FRAC_PI_4,
        };
        // on the ring, inside the cap
        assert!(arc.distance(Vec3::new(0.0, 1.0, 0.0)) < 0.0);
        // on the ring, outside the cap
        assert!(arc.distance(Vec3::new(0.0, -1.0, 0.0)) > 0.5);
    }

    #[test]
    fn colliders_follow_scale() {
        let sphere = Shape::Sphere { radius: 0.5 }.collider(Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(sphere, ColliderShape::Sphere { radius: 2.0 });

        let ring = Shape::Torus {
            major_radius: 1.0,
            minor_radius: 0.25,
        }
        .collider(Vec3::ONE);
        assert_eq!(
            ring,
            ColliderShape::Cylinder {
                radius: 1.25,
                half_height: 0.25
            }
        );
    }
}
