//! One-to-one link between scene primitives and physics bodies.
//!
//! The bridge is the only path by which simulated motion reaches a primitive. A
//! binding is created once per primitive, seeded from the primitive's current pose,
//! and after every physics step the dynamic ones are copied back.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use physics::{BodyHandle, ColliderHandle, ColliderShape, PhysicsEngine, PhysicsWorld, Pose, StaticHandle};
use tracing::debug;

use crate::error::SceneError;
use crate::registry::{PrimitiveHandle, SceneRegistry};

/// Lifecycle of a primitive with respect to physics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingState {
    Unbound,
    Dynamic,
    Static,
    /// Was bound, the engine object has since been removed. May be bound again.
    Released,
}

/// The engine object behind a binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic(BodyHandle),
    Static(StaticHandle),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicsBinding {
    pub body: BodyKind,
    pub collider: ColliderHandle,
    /// Zero for statics.
    pub mass: f32,
}

impl PhysicsBinding {
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self.body, BodyKind::Static(_))
    }
}

pub struct PhysicsBridge {
    engine: Box<dyn PhysicsEngine>,
    bindings: BTreeMap<PrimitiveHandle, PhysicsBinding>,
    released: BTreeSet<PrimitiveHandle>,
    activity_threshold: f32,
}

impl Default for PhysicsBridge {
    fn default() -> Self {
        Self::new(Box::<PhysicsWorld>::default(), 0.01)
    }
}

impl std::fmt::Debug for PhysicsBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsBridge")
            .field("bindings", &self.bindings)
            .field("released", &self.released)
            .field("activity_threshold", &self.activity_threshold)
            .finish_non_exhaustive()
    }
}

impl PhysicsBridge {
    /// `activity_threshold` is handed to every dynamic body this bridge creates.
    #[must_use]
    pub fn new(engine: Box<dyn PhysicsEngine>, activity_threshold: f32) -> Self {
        Self {
            engine,
            bindings: BTreeMap::new(),
            released: BTreeSet::new(),
            activity_threshold,
        }
    }

    /// Binds a primitive using the collider its shape and scale describe.
    ///
    /// # Errors
    ///
    /// See [`Self::bind_with_collider`].
    pub fn bind(
        &mut self,
        registry: &SceneRegistry,
        handle: PrimitiveHandle,
        mass: f32,
        is_static: bool,
    ) -> Result<BodyKind, SceneError> {
        let collider = registry.get(handle)?.collider();
        self.bind_with_collider(registry, handle, collider, mass, is_static)
    }

    /// Creates exactly one body (or static) for `handle`, at the primitive's pose.
    ///
    /// # Errors
    ///
    /// - [`SceneError::StalePrimitive`] if the primitive is gone.
    /// - [`SceneError::AlreadyBound`] if it is bound already.
    /// - [`SceneError::Physics`] if the engine rejects the body, e.g. a dynamic plane
    ///   or a non-positive mass.
    pub fn bind_with_collider(
        &mut self,
        registry: &SceneRegistry,
        handle: PrimitiveHandle,
        collider: ColliderShape,
        mass: f32,
        is_static: bool,
    ) -> Result<BodyKind, SceneError> {
        let transform = registry.get(handle)?.transform;
        if self.bindings.contains_key(&handle) {
            return Err(SceneError::AlreadyBound(handle));
        }

        // validate before touching the engine so a rejected bind leaves nothing behind
        let inertia = if is_static { None } else { Some(collider.inertia(mass)?) };

        let pose = Pose::new(transform.position, transform.rotation());
        let collider_handle = self.engine.add_collider(collider);
        let body = match inertia {
            None => BodyKind::Static(self.engine.add_static(pose, collider_handle)?),
            Some(inertia) => BodyKind::Dynamic(self.engine.add_body(
                pose,
                inertia,
                collider_handle,
                self.activity_threshold,
            )?),
        };

        self.bindings.insert(
            handle,
            PhysicsBinding {
                body,
                collider: collider_handle,
                mass: if is_static { 0.0 } else { mass },
            },
        );
        self.released.remove(&handle);
        debug!(?handle, ?body, collider = collider.name(), "bound primitive");
        Ok(body)
    }

    #[must_use]
    pub fn state(&self, handle: PrimitiveHandle) -> BindingState {
        match self.bindings.get(&handle) {
            Some(binding) if binding.is_static() => BindingState::Static,
            Some(_) => BindingState::Dynamic,
            None if self.released.contains(&handle) => BindingState::Released,
            None => BindingState::Unbound,
        }
    }

    #[must_use]
    pub fn binding(&self, handle: PrimitiveHandle) -> Option<&PhysicsBinding> {
        self.bindings.get(&handle)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (PrimitiveHandle, &PhysicsBinding)> + '_ {
        self.bindings.iter().map(|(handle, binding)| (*handle, binding))
    }

    /// Copies the simulated pose onto the primitive. Statics are left alone.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotBound`], [`SceneError::StalePrimitive`], or an engine error.
    pub fn sync_from_physics(
        &self,
        registry: &mut SceneRegistry,
        handle: PrimitiveHandle,
    ) -> Result<(), SceneError> {
        let binding = self.bindings.get(&handle).ok_or(SceneError::NotBound(handle))?;
        let BodyKind::Dynamic(body) = binding.body else {
            return Ok(());
        };
        let pose = self.engine.body_pose(body)?;
        let transform = &mut registry.get_mut(handle)?.transform;
        transform.position = pose.position;
        transform.set_rotation(pose.orientation);
        Ok(())
    }

    /// Syncs every dynamic binding.
    ///
    /// # Errors
    ///
    /// The first failure from [`Self::sync_from_physics`].
    pub fn sync_all(&self, registry: &mut SceneRegistry) -> Result<(), SceneError> {
        self.bindings
            .keys()
            .try_for_each(|handle| self.sync_from_physics(registry, *handle))
    }

    /// Forwards a linear impulse. A no-op for statics.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotBound`] or an engine error.
    pub fn apply_force(&mut self, handle: PrimitiveHandle, impulse: Vec3) -> Result<(), SceneError> {
        if let BodyKind::Dynamic(body) = self.body_of(handle)? {
            self.engine.apply_linear_impulse(body, impulse)?;
        }
        Ok(())
    }

    /// Forwards an angular impulse. A no-op for statics.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotBound`] or an engine error.
    pub fn apply_angular_force(&mut self, handle: PrimitiveHandle, impulse: Vec3) -> Result<(), SceneError> {
        if let BodyKind::Dynamic(body) = self.body_of(handle)? {
            self.engine.apply_angular_impulse(body, impulse)?;
        }
        Ok(())
    }

    /// Removes the engine object and its collider, and moves the binding to
    /// [`BindingState::Released`].
    ///
    /// # Errors
    ///
    /// [`SceneError::NotBound`] or an engine error.
    pub fn release(&mut self, handle: PrimitiveHandle) -> Result<(), SceneError> {
        let binding = self.bindings.remove(&handle).ok_or(SceneError::NotBound(handle))?;
        match binding.body {
            BodyKind::Dynamic(body) => {
                self.engine.remove_body(body)?;
            }
            BodyKind::Static(fixed) => self.engine.remove_static(fixed)?,
        }
        self.engine.remove_collider(binding.collider)?;
        self.released.insert(handle);
        debug!(?handle, body = ?binding.body, "released binding");
        Ok(())
    }

    /// Drops everything the bridge knows about `handle`, releasing a live binding
    /// first. The handle reads as [`BindingState::Unbound`] afterwards.
    ///
    /// # Errors
    ///
    /// An engine error while releasing.
    pub fn forget(&mut self, handle: PrimitiveHandle) -> Result<(), SceneError> {
        if self.bindings.contains_key(&handle) {
            self.release(handle)?;
        }
        self.released.remove(&handle);
        Ok(())
    }

    /// Primitives currently moved to [`BindingState::Released`].
    #[must_use]
    pub fn released_count(&self) -> usize {
        self.released.len()
    }

    /// Advances the engine by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.engine.step(dt);
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.engine.set_gravity(gravity);
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.engine.set_damping(damping);
    }

    pub fn set_activity_threshold(&mut self, threshold: f32) {
        self.activity_threshold = threshold;
    }

    #[must_use]
    pub fn engine(&self) -> &dyn PhysicsEngine {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> &mut dyn PhysicsEngine {
        self.engine.as_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn body_of(&self, handle: PrimitiveHandle) -> Result<BodyKind, SceneError> {
        self.bindings
            .get(&handle)
            .map(|binding| binding.body)
            .ok_or(SceneError::NotBound(handle))
    }
}
