use thiserror::Error;

use crate::types::{BodyHandle, ColliderHandle, StaticHandle};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("unknown body handle {0:?}")]
    UnknownBody(BodyHandle),
    #[error("unknown static handle {0:?}")]
    UnknownStatic(StaticHandle),
    #[error("unknown collider handle {0:?}")]
    UnknownCollider(ColliderHandle),
    #[error("collider {0:?} is still referenced by a body or static")]
    ColliderInUse(ColliderHandle),
    #[error("invalid mass {0}: dynamic bodies need a finite, positive mass")]
    InvalidMass(f32),
    #[error("collider shape `{0}` cannot belong to a dynamic body")]
    UnboundedShape(&'static str),
}
