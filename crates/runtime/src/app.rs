//! The main loop: config, demo scene, frame scheduler and backend.

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use render::HeadlessBackend;
use scene::query::raymarch;
use scene::{FrameScheduler, RaymarchSettings, RenderBackend, SceneConfig, World};
use tracing::{info, warn};

use crate::demo::{self, DemoScene, ScriptedInput};
use crate::watcher;
use crate::Args;

const REPORT_EVERY: u64 = 120;

/// Applies a reloaded config to a running world and returns whether anything changed.
///
/// Physics tuning takes effect on the next frame. Capacities are fixed once the
/// registry exists, so changes to them are reported and otherwise ignored.
pub fn apply_reload(world: &mut World, scheduler: &mut FrameScheduler, current: &mut SceneConfig, next: SceneConfig) -> bool {
    if next.capacities != current.capacities {
        warn!(
            current = ?current.capacities,
            requested = ?next.capacities,
            "capacities are fixed at startup; restart to apply"
        );
    }
    if next.physics == current.physics {
        return false;
    }
    world.apply_physics_settings(&next.physics);
    scheduler.apply_settings(&next.physics);
    info!(physics = ?next.physics, "reloaded physics settings");
    current.physics = next.physics;
    true
}

fn load_config(args: &Args) -> Result<SceneConfig> {
    match &args.config {
        Some(path) => {
            let config = watcher::load(path)?;
            info!("Loaded scene config from {}", path.display());
            Ok(config)
        }
        None => {
            info!("No config given, using defaults");
            Ok(SceneConfig::default())
        }
    }
}

fn start_watcher(args: &Args) -> Option<(notify::RecommendedWatcher, Receiver<SceneConfig>)> {
    if !args.watch {
        return None;
    }
    let Some(path) = &args.config else {
        warn!("--watch needs --config; hot reload disabled");
        return None;
    };
    match watcher::start(path) {
        Ok(started) => Some(started),
        Err(e) => {
            tracing::error!("Failed to start config watcher: {e:?}");
            None
        }
    }
}

/// Runs `args.frames` frames of the demo scene.
pub fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args)?;
    let mut world = World::new(&config);
    let demo = demo::populate(&mut world).context("failed to build the demo scene")?;
    let mut scheduler = FrameScheduler::new(&config.physics);
    log_center_pick(&world)?;

    #[cfg(feature = "gpu")]
    if args.gpu {
        let context = render::GpuContext::headless()?;
        let mut backend = render::GpuBackend::new(context, config.capacities.total());
        info!("Uploading frames to the GPU");
        return drive(args, &mut world, &mut scheduler, &mut config, &demo, &mut backend);
    }

    info!("Running in headless mode. Frames are captured in memory.");
    let mut backend = HeadlessBackend::default();
    drive(args, &mut world, &mut scheduler, &mut config, &demo, &mut backend)?;
    info!(
        presents = backend.presents(),
        bytes = backend.bytes_uploaded(),
        "headless backend finished"
    );
    if let Some(frame) = backend.last_frame() {
        info!(records = frame.records.len(), slots = frame.slots.len(), "last frame");
    }
    Ok(())
}

/// Reports what sits under the middle of the screen before the first frame.
fn log_center_pick(world: &World) -> Result<()> {
    let camera = world.active_camera()?;
    let hit = raymarch(
        &world.registry,
        camera.transform.position,
        camera.direction(),
        &RaymarchSettings::default(),
    );
    match hit {
        Some(hit) => {
            let kind = world.registry.get(hit.primitive)?.kind();
            info!(%kind, distance = hit.t, point = ?hit.point, "camera centre hits");
        }
        None => info!("camera centre hits nothing"),
    }
    Ok(())
}

fn drive(
    args: &Args,
    world: &mut World,
    scheduler: &mut FrameScheduler,
    config: &mut SceneConfig,
    demo: &DemoScene,
    backend: &mut dyn RenderBackend,
) -> Result<()> {
    let reloads = start_watcher(args);
    let mut input = ScriptedInput::default();
    let started = Instant::now();

    info!("Starting frame loop for {} frames with dt = {}...", args.frames, args.dt);
    for _ in 0..args.frames {
        if let Some((_, receiver)) = &reloads {
            for next in receiver.try_iter() {
                apply_reload(world, scheduler, config, next);
            }
        }

        let time = scheduler
            .run_frame(world, &mut input, backend, args.dt)
            .with_context(|| format!("frame {} failed", scheduler.frames_run()))?;

        if (time.frame + 1) % REPORT_EVERY == 0 {
            let ball = world.registry.get(demo.ball)?.transform.position;
            let ring_yaw = world.objects.get(demo.ring)?.transform.euler_degrees().y;
            info!(
                frame = time.frame + 1,
                elapsed = time.elapsed,
                ?ball,
                ring_yaw,
                "frame report"
            );
        }
        if reloads.is_some() {
            std::thread::sleep(Duration::from_secs_f32(args.dt.max(0.0)));
        }
    }

    world.end()?;
    let crate_box = world.registry.get(demo.crate_box)?.transform.position;
    info!(
        frames = scheduler.frames_run(),
        wall = ?started.elapsed(),
        ?crate_box,
        "Frame loop finished"
    );
    Ok(())
}
