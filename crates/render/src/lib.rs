//! Render backends for the frames produced by [`scene::FrameScheduler`].
//!
//! [`HeadlessBackend`] is always available and keeps frames in memory. With the `gpu`
//! feature, [`gpu::GpuBackend`] writes the same frames into wgpu buffers that a
//! raymarching pass can bind.

pub mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod headless;

pub use error::RenderError;
#[cfg(feature = "gpu")]
pub use gpu::{GpuBackend, GpuContext, SceneBuffers};
pub use headless::{CapturedFrame, HeadlessBackend};
