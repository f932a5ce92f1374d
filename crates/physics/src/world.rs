//! # Physics World
//!
//! The built-in [`PhysicsEngine`] implementation: dynamic bodies integrated with
//! semi-implicit Euler, contacts against static planes and activity-based sleeping.

use glam::Vec3;

use crate::collision::{detect_plane_contact, resolve_plane_contact, world_plane};
use crate::engine::PhysicsEngine;
use crate::error::PhysicsError;
use crate::integrator::{angular_velocity_change, apply_damping, integrate_pose, integrate_velocity};
use crate::shapes::ColliderShape;
use crate::types::{
    BodyHandle, BodyInertia, BodyVelocity, ColliderHandle, PhysParams, Pose, StaticHandle,
};

/// Consecutive quiet steps before a body falls asleep.
const SLEEP_DELAY_STEPS: u32 = 30;

#[derive(Clone, Debug)]
struct RigidBody {
    pose: Pose,
    velocity: BodyVelocity,
    inertia: BodyInertia,
    collider: ColliderHandle,
    activity_threshold: f32,
    quiet_steps: u32,
    awake: bool,
}

impl RigidBody {
    fn wake(&mut self) {
        self.awake = true;
        self.quiet_steps = 0;
    }
}

#[derive(Clone, Debug)]
struct StaticObject {
    pose: Pose,
    collider: ColliderHandle,
}

/// Main physics simulation container
#[derive(Debug, Default)]
pub struct PhysicsWorld {
    pub params: PhysParams,
    colliders: Vec<Option<ColliderShape>>,
    free_colliders: Vec<ColliderHandle>,
    bodies: Vec<Option<RigidBody>>,
    statics: Vec<Option<StaticObject>>,
}

impl PhysicsWorld {
    #[must_use]
    pub fn new(params: PhysParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownCollider`] for unregistered handles.
    pub fn collider(&self, handle: ColliderHandle) -> Result<&ColliderShape, PhysicsError> {
        self.colliders
            .get(handle.index())
            .and_then(Option::as_ref)
            .ok_or(PhysicsError::UnknownCollider(handle))
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for removed or foreign handles.
    pub fn body_velocity(&self, body: BodyHandle) -> Result<BodyVelocity, PhysicsError> {
        Ok(self.body(body)?.velocity)
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for removed or foreign handles.
    pub fn is_awake(&self, body: BodyHandle) -> Result<bool, PhysicsError> {
        Ok(self.body(body)?.awake)
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownStatic`] for removed or foreign handles.
    pub fn static_pose(&self, handle: StaticHandle) -> Result<Pose, PhysicsError> {
        self.statics
            .get(handle.index())
            .and_then(Option::as_ref)
            .map(|s| s.pose)
            .ok_or(PhysicsError::UnknownStatic(handle))
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    #[must_use]
    pub fn static_count(&self) -> usize {
        self.statics.iter().flatten().count()
    }

    #[must_use]
    pub fn collider_count(&self) -> usize {
        self.colliders.iter().flatten().count()
    }

    fn collider_in_use(&self, handle: ColliderHandle) -> bool {
        self.bodies.iter().flatten().any(|b| b.collider == handle)
            || self.statics.iter().flatten().any(|s| s.collider == handle)
    }

    fn body(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.bodies
            .get(handle.index())
            .and_then(Option::as_ref)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies
            .get_mut(handle.index())
            .and_then(Option::as_mut)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// World-space planes of every static plane collider.
    fn static_planes(&self) -> Vec<(Vec3, f32)> {
        self.statics
            .iter()
            .flatten()
            .filter_map(|s| match self.colliders.get(s.collider.index()).and_then(Option::as_ref) {
                Some(ColliderShape::Plane { normal, offset }) => {
                    Some(world_plane(&s.pose, *normal, *offset))
                }
                _ => None,
            })
            .collect()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn next_index<T>(items: &[T]) -> u32 {
    items.len() as u32
}

impl PhysicsEngine for PhysicsWorld {
    fn add_collider(&mut self, shape: ColliderShape) -> ColliderHandle {
        if let Some(handle) = self.free_colliders.pop() {
            self.colliders[handle.index()] = Some(shape);
            return handle;
        }
        let handle = ColliderHandle(next_index(&self.colliders));
        self.colliders.push(Some(shape));
        handle
    }

    fn add_body(
        &mut self,
        pose: Pose,
        inertia: BodyInertia,
        collider: ColliderHandle,
        activity_threshold: f32,
    ) -> Result<BodyHandle, PhysicsError> {
        self.collider(collider)?;
        let handle = BodyHandle(next_index(&self.bodies));
        self.bodies.push(Some(RigidBody {
            pose,
            velocity: BodyVelocity::default(),
            inertia,
            collider,
            activity_threshold,
            quiet_steps: 0,
            awake: true,
        }));
        tracing::trace!(?handle, ?pose, "added body");
        Ok(handle)
    }

    fn add_static(&mut self, pose: Pose, collider: ColliderHandle) -> Result<StaticHandle, PhysicsError> {
        self.collider(collider)?;
        let handle = StaticHandle(next_index(&self.statics));
        self.statics.push(Some(StaticObject { pose, collider }));
        tracing::trace!(?handle, ?pose, "added static");
        Ok(handle)
    }

    fn body_pose(&self, body: BodyHandle) -> Result<Pose, PhysicsError> {
        Ok(self.body(body)?.pose)
    }

    fn apply_linear_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError> {
        let rigid = self.body_mut(body)?;
        rigid.velocity.linear += impulse * rigid.inertia.inverse_mass;
        rigid.wake();
        Ok(())
    }

    fn apply_angular_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError> {
        let rigid = self.body_mut(body)?;
        rigid.velocity.angular += angular_velocity_change(rigid.pose.orientation, &rigid.inertia, impulse);
        rigid.wake();
        Ok(())
    }

    fn remove_body(&mut self, body: BodyHandle) -> Result<Pose, PhysicsError> {
        self.bodies
            .get_mut(body.index())
            .and_then(Option::take)
            .map(|rigid| rigid.pose)
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn remove_static(&mut self, handle: StaticHandle) -> Result<(), PhysicsError> {
        self.statics
            .get_mut(handle.index())
            .and_then(Option::take)
            .map(|_| ())
            .ok_or(PhysicsError::UnknownStatic(handle))
    }

    fn remove_collider(&mut self, handle: ColliderHandle) -> Result<(), PhysicsError> {
        self.collider(handle)?;
        if self.collider_in_use(handle) {
            return Err(PhysicsError::ColliderInUse(handle));
        }
        self.colliders[handle.index()] = None;
        self.free_colliders.push(handle);
        Ok(())
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.params.gravity = gravity;
        for rigid in self.bodies.iter_mut().flatten() {
            rigid.wake();
        }
    }

    fn set_damping(&mut self, damping: f32) {
        self.params.damping = damping;
    }

    fn step(&mut self, dt: f32) {
        let planes = self.static_planes();
        let params = self.params;

        for rigid in self.bodies.iter_mut().flatten() {
            if !rigid.awake {
                continue;
            }

            integrate_velocity(&mut rigid.velocity, &rigid.inertia, params.gravity, dt);
            integrate_pose(&mut rigid.pose, &rigid.velocity, dt);

            if let Some(shape) = self.colliders.get(rigid.collider.index()).and_then(Option::as_ref) {
                for &(normal, offset) in &planes {
                    if let Some(contact) = detect_plane_contact(shape, &rigid.pose, normal, offset) {
                        resolve_plane_contact(
                            &mut rigid.pose,
                            &mut rigid.velocity,
                            &rigid.inertia,
                            &contact,
                            &params.material,
                        );
                    }
                }
            }

            apply_damping(&mut rigid.velocity, params.damping);

            if rigid.velocity.energy_proxy() < rigid.activity_threshold {
                rigid.quiet_steps += 1;
                if rigid.quiet_steps >= SLEEP_DELAY_STEPS {
                    rigid.awake = false;
                    rigid.velocity = BodyVelocity::default();
                }
            } else {
                rigid.quiet_steps = 0;
            }
        }
    }
}
