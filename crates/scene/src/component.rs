//! Capabilities attached to game objects.
//!
//! A component sees its owner's transform and a [`FrameContext`] carrying everything
//! else it may touch. There is no global state: whatever a component needs arrives
//! through these two arguments.

use glam::{Quat, Vec3};
use tracing::trace;

use crate::error::SceneError;
use crate::input::InputState;
use crate::physics_bridge::{BindingState, PhysicsBridge};
use crate::registry::{PrimitiveHandle, SceneRegistry};
use crate::transform::Transform;

/// Mutable scene state threaded through every component call of a frame.
pub struct FrameContext<'a> {
    pub registry: &'a mut SceneRegistry,
    pub bridge: &'a mut PhysicsBridge,
    pub input: InputState,
    /// Seconds since the previous frame
    pub dt: f32,
}

/// Constant linear and angular velocity applied to the owner.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Movement {
    pub velocity: Vec3,
    /// Pitch/yaw/roll rates in degrees per second
    pub angular_velocity: Vec3,
}

/// Keeps a primitive at the owner's transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RendererBinding {
    pub primitive: PrimitiveHandle,
}

/// Makes the owner's primitive a physics body and follows the simulated pose.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicsBody {
    pub primitive: PrimitiveHandle,
    pub mass: f32,
    pub is_static: bool,
}

/// What an [`InputBinding`] drives.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputTarget {
    /// Fly the owner directly.
    Transform,
    /// Push the physics body bound to this primitive.
    Body(PrimitiveHandle),
}

/// Turns held keys and mouse motion into movement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InputBinding {
    pub target: InputTarget,
    /// Units per second, or impulse per second for bodies
    pub speed: f32,
    /// Degrees of yaw per pixel of horizontal mouse motion
    pub look_sensitivity: f32,
}

impl InputBinding {
    #[must_use]
    pub fn new(target: InputTarget) -> Self {
        Self {
            target,
            speed: 5.0,
            look_sensitivity: 0.1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Component {
    Movement(Movement),
    Renderer(RendererBinding),
    Physics(PhysicsBody),
    Input(InputBinding),
}

impl Component {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Movement(_) => "movement",
            Self::Renderer(_) => "renderer",
            Self::Physics(_) => "physics",
            Self::Input(_) => "input",
        }
    }

    /// The primitive this component drives, if any.
    #[must_use]
    pub fn primitive(&self) -> Option<PrimitiveHandle> {
        match self {
            Self::Renderer(RendererBinding { primitive })
            | Self::Physics(PhysicsBody { primitive, .. })
            | Self::Input(InputBinding {
                target: InputTarget::Body(primitive),
                ..
            }) => Some(*primitive),
            Self::Movement(_) | Self::Input(_) => None,
        }
    }

    /// Called once when the component is attached.
    ///
    /// # Errors
    ///
    /// [`SceneError::StalePrimitive`] if the component refers to a removed primitive.
    pub fn on_added(&mut self, owner: &mut Transform, ctx: &mut FrameContext<'_>) -> Result<(), SceneError> {
        trace!(component = self.name(), "attached");
        match self {
            Self::Renderer(renderer) => write_transform(ctx.registry, renderer.primitive, owner),
            Self::Physics(body) => ctx.registry.get(body.primitive).map(|_| ()),
            Self::Input(InputBinding {
                target: InputTarget::Body(primitive),
                ..
            }) => ctx.registry.get(*primitive).map(|_| ()),
            Self::Movement(_) | Self::Input(_) => Ok(()),
        }
    }

    /// Called once before the first update.
    ///
    /// # Errors
    ///
    /// Binding failures from [`PhysicsBridge::bind`].
    pub fn start(&mut self, owner: &mut Transform, ctx: &mut FrameContext<'_>) -> Result<(), SceneError> {
        if let Self::Physics(body) = self {
            // the body starts wherever the owner stands now
            write_transform(ctx.registry, body.primitive, owner)?;
            ctx.bridge.bind(ctx.registry, body.primitive, body.mass, body.is_static)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Stale primitives, unbound bodies, or engine errors.
    pub fn update(&mut self, owner: &mut Transform, ctx: &mut FrameContext<'_>) -> Result<(), SceneError> {
        let dt = ctx.dt;
        match self {
            Self::Movement(movement) => {
                owner.translate(movement.velocity * dt);
                if movement.angular_velocity != Vec3::ZERO {
                    owner.rotate_euler_degrees(movement.angular_velocity * dt);
                }
                Ok(())
            }
            Self::Renderer(renderer) => write_transform(ctx.registry, renderer.primitive, owner),
            Self::Physics(body) => {
                if ctx.bridge.state(body.primitive) == BindingState::Dynamic {
                    let simulated = ctx.registry.get(body.primitive)?.transform;
                    owner.position = simulated.position;
                    owner.set_rotation(simulated.rotation());
                }
                Ok(())
            }
            Self::Input(binding) => drive(binding, owner, ctx.bridge, &ctx.input, dt),
        }
    }

    /// Called once when the scene shuts down.
    ///
    /// # Errors
    ///
    /// Engine errors while removing a body.
    pub fn end(&mut self, _owner: &mut Transform, ctx: &mut FrameContext<'_>) -> Result<(), SceneError> {
        if let Self::Physics(body) = self {
            if matches!(
                ctx.bridge.state(body.primitive),
                BindingState::Dynamic | BindingState::Static
            ) {
                ctx.bridge.release(body.primitive)?;
            }
        }
        Ok(())
    }
}

fn write_transform(
    registry: &mut SceneRegistry,
    primitive: PrimitiveHandle,
    owner: &Transform,
) -> Result<(), SceneError> {
    registry.get_mut(primitive)?.transform = *owner;
    Ok(())
}

fn drive(
    binding: &InputBinding,
    owner: &mut Transform,
    bridge: &mut PhysicsBridge,
    input: &InputState,
    dt: f32,
) -> Result<(), SceneError> {
    let axes = input.movement_axes();
    let yaw = -input.mouse_delta.x * binding.look_sensitivity;

    match binding.target {
        InputTarget::Transform => {
            let direction = owner.right() * axes.x + Vec3::Y * axes.y + owner.forward() * axes.z;
            if let Some(direction) = direction.try_normalize() {
                owner.translate(direction * binding.speed * dt);
            }
            if yaw != 0.0 {
                owner.rotate(Quat::from_rotation_y(yaw.to_radians()));
            }
            let pitch = -input.mouse_delta.y * binding.look_sensitivity;
            if pitch != 0.0 {
                owner.rotate_local(Quat::from_rotation_x(pitch.to_radians()));
            }
            Ok(())
        }
        InputTarget::Body(primitive) => {
            let push = Vec3::new(axes.x, axes.y, -axes.z);
            if let Some(push) = push.try_normalize() {
                bridge.apply_force(primitive, push * binding.speed * dt)?;
            }
            if yaw != 0.0 {
                bridge.apply_angular_force(primitive, Vec3::Y * yaw.to_radians() * dt)?;
            }
            Ok(())
        }
    }
}
