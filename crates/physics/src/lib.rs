#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Physics
//!
//! A small rigid-body simulation used by the scene layer as its physics collaborator.
//!
//! ## Key Components
//!
//! -   **[`PhysicsEngine`]:** the per-body surface the scene consumes: register
//!     colliders, add dynamic bodies or statics, read poses back and push impulses.
//! -   **[`PhysicsWorld`]:** the built-in implementation. Bodies are integrated with
//!     semi-implicit Euler under gravity, collide with static planes, and fall asleep
//!     once their velocity stays under their activity threshold.
//! -   **[`ColliderShape`]:** sphere, box, ellipsoid, cylinder and plane geometry with
//!     solid-body inertia.
//!
//! ## Usage
//!
//! ```rust
//! use glam::Vec3;
//! use physics::{ColliderShape, PhysicsEngine, PhysicsWorld, Pose};
//!
//! let mut world = PhysicsWorld::default();
//! let ball = ColliderShape::Sphere { radius: 0.5 };
//! let collider = world.add_collider(ball);
//! let body = world
//!     .add_body(Pose::from_position(Vec3::new(0.0, 10.0, 0.0)), ball.inertia(1.0)?, collider, 0.01)?;
//!
//! world.step(0.01);
//! assert!(world.body_pose(body)?.position.y < 10.0);
//! # Ok::<(), physics::PhysicsError>(())
//! ```

pub mod collision;
pub mod engine;
pub mod error;
pub mod integrator;
pub mod shapes;
pub mod types;
pub mod world;

pub use engine::PhysicsEngine;
pub use error::PhysicsError;
pub use shapes::ColliderShape;
pub use types::{
    BodyHandle, BodyInertia, BodyVelocity, ColliderHandle, Material, PhysParams, Pose, StaticHandle,
};
pub use world::PhysicsWorld;
