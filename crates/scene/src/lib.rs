#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Scene
//!
//! The scene layer of an SDF raymarching engine: it owns every renderable primitive,
//! keeps those primitives in step with the physics simulation and turns them into the
//! flat records the raymarching shader reads.
//!
//! ## Key Components
//!
//! -   **[`SceneRegistry`]:** one fixed-capacity [`PrimitiveSlotPool`] per
//!     [`ShapeKind`], plus the claim-order list that encoding walks. A full pool is a
//!     [`SceneError::CapacityExceeded`] returned to the caller.
//! -   **[`RenderDataEncoder`]:** converts primitives to [`RenderRecord`]s (Euler
//!     rotation, never quaternions), either in claim order or one record per slot.
//! -   **[`PhysicsBridge`]:** binds primitives to bodies of any [`physics::PhysicsEngine`]
//!     and copies simulated poses back after each step.
//! -   **[`World`] and [`FrameScheduler`]:** the object graph, cameras and the frame
//!     pipeline (physics, copy-back, components, encode, upload, present).
//!
//! ## Usage
//!
//! ```rust
//! use glam::Vec3;
//! use scene::{CapacityTable, Primitive, RenderDataEncoder, SceneRegistry, Shape, ShapeKind};
//!
//! let mut registry = SceneRegistry::new(&CapacityTable::empty().with(ShapeKind::Sphere, 2));
//! registry.add_primitive(Primitive::new(Shape::Sphere { radius: 1.0 }))?;
//! registry.add_primitive(Primitive::new(Shape::Sphere { radius: 2.0 }).at(Vec3::X))?;
//! assert!(registry.add_primitive(Primitive::new(Shape::Sphere { radius: 3.0 })).is_err());
//!
//! let mut encoder = RenderDataEncoder::new();
//! let records = encoder.encode_registry(&registry);
//! assert_eq!(records[1].options, [2.0, 0.0, 0.0, 0.0]);
//! # Ok::<(), scene::SceneError>(())
//! ```

pub mod camera;
pub mod component;
pub mod config;
pub mod error;
pub mod game_object;
pub mod input;
pub mod math;
pub mod physics_bridge;
pub mod pool;
pub mod primitive;
pub mod query;
pub mod registry;
pub mod render_data;
pub mod scheduler;
pub mod shape;
pub mod transform;
pub mod world;

pub use camera::{Camera, CameraId};
pub use component::{
    Component, FrameContext, InputBinding, InputTarget, Movement, PhysicsBody, RendererBinding,
};
pub use config::{PhysicsSettings, SceneConfig};
pub use error::SceneError;
pub use game_object::{GameObject, GameObjectId, GameObjects};
pub use input::{InputSource, InputState, Key, NoInput};
pub use physics_bridge::{BindingState, BodyKind, PhysicsBinding, PhysicsBridge};
pub use pool::{PrimitiveSlotPool, SlotIndex};
pub use primitive::Primitive;
pub use query::{RayHit, RaymarchSettings};
pub use registry::{CapacityTable, PrimitiveHandle, SceneRegistry};
pub use render_data::{
    encode_frame, encode_primitive, FrameUniform, RenderDataEncoder, RenderRecord, SceneLayout, SlotRange,
};
pub use scheduler::{BackendError, FramePacket, FrameScheduler, FrameTime, RenderBackend};
pub use shape::{Shape, ShapeKind};
pub use transform::Transform;
pub use world::{BodySpec, World};
