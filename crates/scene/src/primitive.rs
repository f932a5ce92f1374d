use glam::{Quat, Vec3, Vec4};
use physics::ColliderShape;

use crate::shape::{Shape, ShapeKind};
use crate::transform::Transform;

/// A placed SDF shape.
///
/// The shape (and with it the kind) is fixed at construction; everything else can be
/// mutated in place by movement and physics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Primitive {
    pub transform: Transform,
    shape: Shape,
    pub color: Vec4,
    /// Free shader parameters, zero unless set.
    pub material: [f32; 2],
}

impl Primitive {
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            transform: Transform::IDENTITY,
            shape,
            color: Vec4::ONE,
            material: [0.0; 2],
        }
    }

    /// A unit primitive of `kind`, as stored in unclaimed slots.
    #[must_use]
    pub fn placeholder(kind: ShapeKind) -> Self {
        Self::new(Shape::unit(kind))
    }

    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    #[must_use]
    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.set_rotation(rotation);
        self
    }

    #[must_use]
    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: [f32; 2]) -> Self {
        self.material = material;
        self
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    #[must_use]
    pub fn sdf_options(&self) -> Vec4 {
        self.shape.sdf_options()
    }

    #[must_use]
    pub fn collider(&self) -> ColliderShape {
        self.shape.collider(self.transform.scale)
    }

    /// Approximate signed distance from a world-space point.
    ///
    /// Exact for uniform scale; non-uniform scale is bounded by the smallest axis.
    #[must_use]
    pub fn distance(&self, world_point: Vec3) -> f32 {
        let local = self.transform.inverse_transform_point(world_point);
        self.shape.distance(local) * self.transform.scale.abs().min_element()
    }
}
