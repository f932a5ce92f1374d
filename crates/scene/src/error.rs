use physics::PhysicsError;
use thiserror::Error;

use crate::camera::CameraId;
use crate::game_object::GameObjectId;
use crate::pool::SlotIndex;
use crate::registry::PrimitiveHandle;
use crate::shape::ShapeKind;

#[derive(Error, Debug)]
pub enum SceneError {
    /// The pool for `kind` has no free slot. Capacities are fixed when the registry
    /// is built.
    #[error("no free {kind} slot: all {capacity} are claimed")]
    CapacityExceeded { kind: ShapeKind, capacity: usize },
    #[error("unknown shape tag `{0}`")]
    InvalidShapeTag(String),
    #[error("primitive handle {0:?} no longer refers to a live primitive")]
    StalePrimitive(PrimitiveHandle),
    #[error("{kind} slot {slot:?} is not claimed")]
    SlotNotClaimed { kind: ShapeKind, slot: SlotIndex },
    #[error("primitive {0:?} is already bound to a physics body")]
    AlreadyBound(PrimitiveHandle),
    #[error("primitive {0:?} is not bound to a physics body")]
    NotBound(PrimitiveHandle),
    #[error("unknown game object {0:?}")]
    UnknownGameObject(GameObjectId),
    #[error("unknown camera {0:?}")]
    UnknownCamera(CameraId),
    #[error("scene has no active camera")]
    NoActiveCamera,
    #[error("physics engine error: {0}")]
    Physics(#[from] PhysicsError),
    #[error("invalid scene configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("render backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
