use glam::{Quat, Vec3};

/// Position and orientation of a body in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    #[must_use]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Opaque reference to a registered collider shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(pub(crate) u32);

/// Opaque reference to a dynamic rigid body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

/// Opaque reference to a static (immovable) object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaticHandle(pub(crate) u32);

macro_rules! handle_index {
    ($($handle:ty),*) => {
        $(impl $handle {
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        })*
    };
}

handle_index!(ColliderHandle, BodyHandle, StaticHandle);

/// Inverse mass properties of a body.
///
/// The inertia tensor is stored as its diagonal in the body's local frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyInertia {
    pub inverse_mass: f32,
    pub inverse_inertia: Vec3,
}

impl BodyInertia {
    /// Infinite mass: impulses and gravity have no effect.
    pub const KINEMATIC: Self = Self {
        inverse_mass: 0.0,
        inverse_inertia: Vec3::ZERO,
    };

    #[must_use]
    pub fn is_kinematic(&self) -> bool {
        self.inverse_mass == 0.0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BodyVelocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl BodyVelocity {
    #[must_use]
    pub fn energy_proxy(&self) -> f32 {
        self.linear.length_squared() + self.angular.length_squared()
    }
}

/// Surface response shared by every contact in the world.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.3,
        }
    }
}

/// Global simulation parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysParams {
    pub gravity: Vec3,
    /// Velocity scale applied once per step.
    pub damping: f32,
    pub material: Material,
}

impl Default for PhysParams {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            damping: 0.999,
            material: Material::default(),
        }
    }
}
