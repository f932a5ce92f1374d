use glam::Vec3;

use crate::error::PhysicsError;
use crate::shapes::ColliderShape;
use crate::types::{BodyHandle, BodyInertia, ColliderHandle, Pose, StaticHandle};

/// Per-body surface of a rigid-body simulation.
///
/// The scene layer only ever talks to physics through this trait, so any solver that
/// can register bodies and report their poses can stand in for [`crate::PhysicsWorld`].
pub trait PhysicsEngine {
    /// Registers collision geometry that bodies and statics can reference.
    fn add_collider(&mut self, shape: ColliderShape) -> ColliderHandle;

    /// Adds a dynamic body.
    ///
    /// Bodies whose velocity stays below `activity_threshold` for a while are put to
    /// sleep until the next impulse.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownCollider`] if `collider` was never registered.
    fn add_body(
        &mut self,
        pose: Pose,
        inertia: BodyInertia,
        collider: ColliderHandle,
        activity_threshold: f32,
    ) -> Result<BodyHandle, PhysicsError>;

    /// Adds an immovable object.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownCollider`] if `collider` was never registered.
    fn add_static(&mut self, pose: Pose, collider: ColliderHandle) -> Result<StaticHandle, PhysicsError>;

    /// Current simulated pose of a body.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for removed or foreign handles.
    fn body_pose(&self, body: BodyHandle) -> Result<Pose, PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for removed or foreign handles.
    fn apply_linear_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for removed or foreign handles.
    fn apply_angular_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError>;

    /// Removes a body, returning its final pose.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] if the body does not exist.
    fn remove_body(&mut self, body: BodyHandle) -> Result<Pose, PhysicsError>;

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownStatic`] if the static does not exist.
    fn remove_static(&mut self, handle: StaticHandle) -> Result<(), PhysicsError>;

    /// Frees collision geometry. Its handle may be handed out again by a later
    /// [`Self::add_collider`].
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownCollider`] if it does not exist, or
    /// [`PhysicsError::ColliderInUse`] while a body or static still references it.
    fn remove_collider(&mut self, handle: ColliderHandle) -> Result<(), PhysicsError>;

    fn set_gravity(&mut self, gravity: Vec3);

    fn set_damping(&mut self, damping: f32);

    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);
}
