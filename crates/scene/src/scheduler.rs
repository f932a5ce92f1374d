//! The per-frame pipeline.
//!
//! One call to [`FrameScheduler::run_frame`] performs, strictly in order:
//!
//! 1. input poll
//! 2. fixed-step physics, as many steps as the accumulated time allows
//! 3. pose copy-back for every dynamic binding
//! 4. component updates
//! 5. encoding of the primitive set and the camera block
//! 6. upload and present through the [`RenderBackend`]
//!
//! Encoding only starts once every bound primitive has its new pose, and nothing can
//! add or remove primitives while the encoder holds the registry.

use tracing::{trace, warn};

use crate::config::PhysicsSettings;
use crate::error::SceneError;
use crate::input::InputSource;
use crate::render_data::{encode_frame, FrameUniform, RenderDataEncoder, RenderRecord, SceneLayout};
use crate::world::World;

/// Timing of one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Zero-based frame counter
    pub frame: u64,
    /// Variable frame delta in seconds
    pub dt: f32,
    /// Seconds since the scheduler started
    pub elapsed: f32,
    /// Physics steps taken this frame
    pub physics_steps: u32,
}

/// Everything a renderer needs for one frame.
#[derive(Copy, Clone, Debug)]
pub struct FramePacket<'a> {
    pub time: FrameTime,
    pub camera: FrameUniform,
    /// Claim-order records
    pub records: &'a [RenderRecord],
    /// One record per pool slot
    pub slots: &'a [RenderRecord],
    pub layout: SceneLayout,
}

pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// The GPU side of a frame.
pub trait RenderBackend {
    /// # Errors
    ///
    /// Backend-specific upload failures.
    fn upload(&mut self, packet: &FramePacket<'_>) -> Result<(), BackendError>;

    /// # Errors
    ///
    /// Backend-specific present failures.
    fn present(&mut self) -> Result<(), BackendError>;
}

/// Drives a [`World`] frame by frame with a fixed physics step.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    fixed_dt: f32,
    max_substeps: u32,
    accumulator: f32,
    elapsed: f32,
    frame: u64,
    encoder: RenderDataEncoder,
}

impl FrameScheduler {
    #[must_use]
    pub fn new(settings: &PhysicsSettings) -> Self {
        Self {
            fixed_dt: settings.fixed_dt.max(f32::EPSILON),
            max_substeps: settings.max_substeps.max(1),
            accumulator: 0.0,
            elapsed: 0.0,
            frame: 0,
            encoder: RenderDataEncoder::new(),
        }
    }

    /// Picks up a new step length and substep cap. Accumulated time is kept.
    pub fn apply_settings(&mut self, settings: &PhysicsSettings) {
        self.fixed_dt = settings.fixed_dt.max(f32::EPSILON);
        self.max_substeps = settings.max_substeps.max(1);
    }

    #[must_use]
    pub fn frames_run(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn encoder(&self) -> &RenderDataEncoder {
        &self.encoder
    }

    /// Runs one frame of `dt` seconds, starting the world first if needed.
    ///
    /// # Errors
    ///
    /// Component, binding and physics failures, [`SceneError::NoActiveCamera`], and
    /// backend failures as [`SceneError::Backend`]. The frame stops at the first error.
    pub fn run_frame(
        &mut self,
        world: &mut World,
        input: &mut dyn InputSource,
        backend: &mut dyn RenderBackend,
        dt: f32,
    ) -> Result<FrameTime, SceneError> {
        world.start()?;
        let state = input.poll();

        let physics_steps = self.step_physics(world, dt);
        world.bridge.sync_all(&mut world.registry)?;
        world.update(dt, state)?;

        self.elapsed += dt;
        let time = FrameTime {
            frame: self.frame,
            dt,
            elapsed: self.elapsed,
            physics_steps,
        };

        let camera = encode_frame(world.active_camera()?, self.elapsed);
        let (records, slots, layout) = self.encoder.encode_scene(&world.registry);
        let packet = FramePacket {
            time,
            camera,
            records,
            slots,
            layout,
        };
        backend.upload(&packet).map_err(SceneError::Backend)?;
        backend.present().map_err(SceneError::Backend)?;

        trace!(
            frame = self.frame,
            records = packet.records.len(),
            physics_steps,
            "frame done"
        );
        self.frame += 1;
        Ok(time)
    }

    fn step_physics(&mut self, world: &mut World, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_substeps {
            world.bridge.step(self.fixed_dt);
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }
        if self.accumulator >= self.fixed_dt {
            warn!(
                dropped = self.accumulator,
                max_substeps = self.max_substeps,
                "physics fell behind, dropping time"
            );
            self.accumulator %= self.fixed_dt;
        }
        steps
    }
}
