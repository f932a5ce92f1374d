use std::collections::BTreeSet;

use physics::{PhysicsEngine, PhysicsWorld};
use tracing::{debug, info, warn};

use crate::camera::{Camera, CameraId};
use crate::component::{Component, FrameContext, PhysicsBody, RendererBinding};
use crate::config::{PhysicsSettings, SceneConfig};
use crate::error::SceneError;
use crate::game_object::{GameObjectId, GameObjects};
use crate::input::InputState;
use crate::physics_bridge::PhysicsBridge;
use crate::primitive::Primitive;
use crate::registry::{PrimitiveHandle, SceneRegistry};
use crate::transform::Transform;

/// Physics parameters for a primitive object.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodySpec {
    pub mass: f32,
    pub is_static: bool,
}

impl BodySpec {
    #[must_use]
    pub const fn dynamic(mass: f32) -> Self {
        Self {
            mass,
            is_static: false,
        }
    }

    pub const STATIC: Self = Self {
        mass: 0.0,
        is_static: true,
    };
}

/// A complete scene: primitives, their physics bindings, the object graph and cameras.
#[derive(Debug)]
pub struct World {
    pub registry: SceneRegistry,
    pub bridge: PhysicsBridge,
    pub objects: GameObjects,
    cameras: Vec<Camera>,
    started: bool,
}

impl Default for World {
    fn default() -> Self {
        Self::new(&SceneConfig::default())
    }
}

impl World {
    /// A world backed by the built-in [`PhysicsWorld`].
    #[must_use]
    pub fn new(config: &SceneConfig) -> Self {
        Self::with_engine(config, Box::new(PhysicsWorld::new(config.physics.params())))
    }

    /// A world driving an arbitrary physics engine.
    #[must_use]
    pub fn with_engine(config: &SceneConfig, engine: Box<dyn PhysicsEngine>) -> Self {
        debug!(capacities = ?config.capacities, "building world");
        Self {
            registry: SceneRegistry::new(&config.capacities),
            bridge: PhysicsBridge::new(engine, config.physics.activity_threshold),
            objects: GameObjects::default(),
            cameras: Vec::new(),
            started: false,
        }
    }

    /// Reapplies the live-tunable part of the physics settings.
    pub fn apply_physics_settings(&mut self, settings: &PhysicsSettings) {
        self.bridge.set_gravity(settings.gravity());
        self.bridge.set_damping(settings.damping);
        self.bridge.set_activity_threshold(settings.activity_threshold);
        info!(gravity = ?settings.gravity, damping = settings.damping, "applied physics settings");
    }

    pub fn add_camera(&mut self, camera: Camera) -> CameraId {
        #[allow(clippy::cast_possible_truncation)]
        let id = CameraId(self.cameras.len() as u32);
        self.cameras.push(camera);
        if self.registry.active_camera().is_none() {
            self.registry.set_active_camera(Some(id));
        }
        id
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownCamera`]
    pub fn camera(&self, id: CameraId) -> Result<&Camera, SceneError> {
        self.cameras.get(id.index()).ok_or(SceneError::UnknownCamera(id))
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownCamera`]
    pub fn camera_mut(&mut self, id: CameraId) -> Result<&mut Camera, SceneError> {
        self.cameras
            .get_mut(id.index())
            .ok_or(SceneError::UnknownCamera(id))
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownCamera`]
    pub fn set_active_camera(&mut self, id: CameraId) -> Result<(), SceneError> {
        self.camera(id)?;
        self.registry.set_active_camera(Some(id));
        Ok(())
    }

    /// # Errors
    ///
    /// [`SceneError::NoActiveCamera`] before any camera was added.
    pub fn active_camera(&self) -> Result<&Camera, SceneError> {
        let id = self.registry.active_camera().ok_or(SceneError::NoActiveCamera)?;
        self.camera(id)
    }

    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> GameObjectId {
        self.objects.spawn(name, transform)
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownGameObject`] if `parent` does not exist.
    pub fn spawn_child(
        &mut self,
        parent: GameObjectId,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<GameObjectId, SceneError> {
        self.objects.spawn_child(parent, name, transform)
    }

    /// Attaches a component, starting it right away if the world is already running.
    ///
    /// # Errors
    ///
    /// Unknown object, or the component's own `on_added`/`start` failure.
    pub fn attach(&mut self, id: GameObjectId, component: Component) -> Result<(), SceneError> {
        let mut ctx = FrameContext {
            registry: &mut self.registry,
            bridge: &mut self.bridge,
            input: InputState::default(),
            dt: 0.0,
        };
        self.objects.attach(id, component, &mut ctx)?;
        if self.started {
            self.objects.start_last(id, &mut ctx)?;
        }
        Ok(())
    }

    /// Registers `primitive` and spawns an object that renders it.
    ///
    /// With a `body`, the object also gets a physics component (ahead of the renderer,
    /// so the rendered pose is the simulated one).
    ///
    /// # Errors
    ///
    /// [`SceneError::CapacityExceeded`], an unusable body, or a binding failure in a
    /// running world. Any error leaves the world unchanged.
    pub fn spawn_primitive_object(
        &mut self,
        name: impl Into<String>,
        primitive: Primitive,
        body: Option<BodySpec>,
    ) -> Result<(GameObjectId, PrimitiveHandle), SceneError> {
        if let Some(BodySpec {
            mass,
            is_static: false,
        }) = body
        {
            primitive.collider().inertia(mass)?;
        }
        let transform = primitive.transform;
        let handle = self.registry.add_primitive(primitive)?;
        let id = self.objects.spawn(name, transform);
        if let Err(e) = self.attach_primitive_components(id, handle, body) {
            self.undo_spawn(id, handle);
            return Err(e);
        }
        Ok((id, handle))
    }

    fn attach_primitive_components(
        &mut self,
        id: GameObjectId,
        handle: PrimitiveHandle,
        body: Option<BodySpec>,
    ) -> Result<(), SceneError> {
        if let Some(BodySpec { mass, is_static }) = body {
            self.attach(
                id,
                Component::Physics(PhysicsBody {
                    primitive: handle,
                    mass,
                    is_static,
                }),
            )?;
        }
        self.attach(id, Component::Renderer(RendererBinding { primitive: handle }))
    }

    fn undo_spawn(&mut self, id: GameObjectId, handle: PrimitiveHandle) {
        if let Err(e) = self.bridge.forget(handle) {
            warn!(?handle, "failed to release a half-spawned binding: {e}");
        }
        self.objects.detach_primitive(handle);
        self.objects.discard_newest(id);
        if let Err(e) = self.registry.remove_primitive(handle) {
            warn!(?handle, "failed to unclaim a half-spawned primitive: {e}");
        }
    }

    /// Releases the primitive's physics binding, if any, detaches the components that
    /// drive it, then unclaims its slot.
    ///
    /// # Errors
    ///
    /// [`SceneError::StalePrimitive`], or an engine error while releasing.
    pub fn remove_primitive(&mut self, handle: PrimitiveHandle) -> Result<Primitive, SceneError> {
        self.registry.get(handle)?;
        self.bridge.forget(handle)?;
        let detached = self.objects.detach_primitive(handle);
        debug!(?handle, detached, "removing primitive");
        self.registry.remove_primitive(handle)
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Starts every component. Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// The first component failure.
    pub fn start(&mut self) -> Result<(), SceneError> {
        if self.started {
            return Ok(());
        }
        let bound_before: BTreeSet<PrimitiveHandle> = self.bridge.bindings().map(|(handle, _)| handle).collect();
        let mut ctx = FrameContext {
            registry: &mut self.registry,
            bridge: &mut self.bridge,
            input: InputState::default(),
            dt: 0.0,
        };
        if let Err(e) = self.objects.start_all(&mut ctx) {
            self.unbind_since(&bound_before);
            return Err(e);
        }
        self.started = true;
        info!(objects = self.objects.len(), primitives = self.registry.len(), "world started");
        Ok(())
    }

    /// Undoes the bindings a failed start made, so a retry starts from scratch.
    fn unbind_since(&mut self, bound_before: &BTreeSet<PrimitiveHandle>) {
        let fresh: Vec<PrimitiveHandle> = self
            .bridge
            .bindings()
            .map(|(handle, _)| handle)
            .filter(|handle| !bound_before.contains(handle))
            .collect();
        for handle in fresh {
            if let Err(e) = self.bridge.forget(handle) {
                warn!(?handle, "failed to undo binding after a failed start: {e}");
            }
        }
    }

    /// Runs one component update pass.
    ///
    /// # Errors
    ///
    /// The first component failure.
    pub fn update(&mut self, dt: f32, input: InputState) -> Result<(), SceneError> {
        let mut ctx = FrameContext {
            registry: &mut self.registry,
            bridge: &mut self.bridge,
            input,
            dt,
        };
        self.objects.update_all(&mut ctx)
    }

    /// Ends every component and releases their bodies.
    ///
    /// # Errors
    ///
    /// The first component failure.
    pub fn end(&mut self) -> Result<(), SceneError> {
        let mut ctx = FrameContext {
            registry: &mut self.registry,
            bridge: &mut self.bridge,
            input: InputState::default(),
            dt: 0.0,
        };
        self.objects.end_all(&mut ctx)?;
        self.started = false;
        Ok(())
    }
}
