//! CPU-side evaluation of the scene's distance field.
//!
//! The scene field is the union (minimum) of every live primitive's SDF. These
//! queries mirror what the raymarching shader computes and are used for picking.

use glam::Vec3;

use crate::registry::{PrimitiveHandle, SceneRegistry};

/// Step used for finite-difference normals.
pub const NORMAL_EPSILON: f32 = 1e-4;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaymarchSettings {
    pub max_steps: u32,
    pub max_distance: f32,
    /// A step shorter than this counts as a hit
    pub hit_epsilon: f32,
}

impl Default for RaymarchSettings {
    fn default() -> Self {
        Self {
            max_steps: 256,
            max_distance: 100.0,
            hit_epsilon: 1e-4,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    pub primitive: PrimitiveHandle,
    /// Distance travelled along the ray
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub steps: u32,
}

/// Closest primitive to `point` and its signed distance, or `None` for an empty scene.
#[must_use]
pub fn distance(registry: &SceneRegistry, point: Vec3) -> Option<(PrimitiveHandle, f32)> {
    registry
        .handles()
        .iter()
        .zip(registry.all_primitives())
        .map(|(handle, primitive)| (*handle, primitive.distance(point)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Surface normal of the scene field at `point` by central differences.
///
/// Returns `None` for an empty scene or where the gradient vanishes.
#[must_use]
pub fn normal(registry: &SceneRegistry, point: Vec3) -> Option<Vec3> {
    let field = |p: Vec3| distance(registry, p).map(|(_, d)| d);
    let axis = |offset: Vec3| Some(field(point + offset)? - field(point - offset)?);
    Vec3::new(
        axis(Vec3::X * NORMAL_EPSILON)?,
        axis(Vec3::Y * NORMAL_EPSILON)?,
        axis(Vec3::Z * NORMAL_EPSILON)?,
    )
    .try_normalize()
}

/// Sphere-traces a ray through the scene.
///
/// `direction` need not be normalised. Returns the first hit within
/// `settings.max_distance`.
#[must_use]
pub fn raymarch(
    registry: &SceneRegistry,
    origin: Vec3,
    direction: Vec3,
    settings: &RaymarchSettings,
) -> Option<RayHit> {
    let direction = direction.try_normalize()?;
    let mut t = 0.0;
    for step in 0..settings.max_steps {
        let point = origin + direction * t;
        let (primitive, d) = distance(registry, point)?;
        if d < settings.hit_epsilon {
            return Some(RayHit {
                primitive,
                t,
                point,
                normal: normal(registry, point).unwrap_or(-direction),
                steps: step + 1,
            });
        }
        t += d;
        if t > settings.max_distance {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Primitive;
    use crate::shape::Shape;

    fn scene() -> (SceneRegistry, PrimitiveHandle, PrimitiveHandle) {
        let mut registry = SceneRegistry::default();
        let ball = registry
            .add_primitive(Primitive::new(Shape::Sphere { radius: 1.0 }).at(Vec3::new(0.0, 1.0, -5.0)))
            .unwrap();
        let ground = registry
            .add_primitive(Primitive::new(Shape::Plane {
                normal: Vec3::Y,
                height: 0.0,
            }))
            .unwrap();
        (registry, ball, ground)
    }

    #[test]
    fn empty_scene_has_no_field() {
        let registry = SceneRegistry::default();
        assert!(distance(&registry, Vec3::ZERO).is_none());
        assert!(raymarch(&registry, Vec3::ZERO, Vec3::NEG_Z, &RaymarchSettings::default()).is_none());
    }

    #[test]
    fn closest_primitive_wins() {
        let (registry, ball, ground) = scene();
        assert_eq!(distance(&registry, Vec3::new(0.0, 1.0, -3.5)).map(|(h, _)| h), Some(ball));
        assert_eq!(distance(&registry, Vec3::new(10.0, 0.5, 0.0)).map(|(h, _)| h), Some(ground));
    }

    #[test]
    fn ray_hits_sphere_front() {
        let (registry, ball, _) = scene();
        let hit = raymarch(
            &registry,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::NEG_Z,
            &RaymarchSettings::default(),
        )
        .unwrap();
        assert_eq!(hit.primitive, ball);
        assert!((hit.t - 4.0).abs() < 1e-3, "{hit:?}");
        assert!((hit.normal - Vec3::Z).length() < 1e-2, "{hit:?}");
    }

    #[test]
    fn ray_into_the_sky_misses() {
        let (registry, _, _) = scene();
        assert!(raymarch(&registry, Vec3::new(0.0, 1.0, 0.0), Vec3::Y, &RaymarchSettings::default()).is_none());
    }

    #[test]
    fn ground_normal_points_up() {
        let (registry, _, _) = scene();
        let n = normal(&registry, Vec3::new(20.0, 0.0, 20.0)).unwrap();
        assert!((n - Vec3::Y).length() < 1e-3);
    }
}
