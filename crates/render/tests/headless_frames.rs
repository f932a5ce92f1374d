use glam::Vec3;
use render::HeadlessBackend;
use scene::{
    BodySpec, Camera, FrameScheduler, NoInput, PhysicsSettings, Primitive, SceneConfig, Shape,
    ShapeKind, World,
};

fn demo_world() -> anyhow::Result<World> {
    let mut world = World::new(&SceneConfig::default());
    world.add_camera(Camera::looking_at(Vec3::new(0.0, 3.0, 8.0), Vec3::ZERO, 16.0 / 9.0));
    world.spawn_primitive_object(
        "ground",
        Primitive::new(Shape::Plane {
            normal: Vec3::Y,
            height: 0.0,
        }),
        Some(BodySpec::STATIC),
    )?;
    world.spawn_primitive_object(
        "ball",
        Primitive::new(Shape::Sphere { radius: 0.5 }).at(Vec3::new(0.0, 4.0, 0.0)),
        Some(BodySpec::dynamic(1.0)),
    )?;
    Ok(world)
}

#[test]
fn captures_what_the_scheduler_encodes() -> anyhow::Result<()> {
    let mut world = demo_world()?;
    let mut scheduler = FrameScheduler::new(&PhysicsSettings::default());
    let mut backend = HeadlessBackend::new(4);

    for _ in 0..10 {
        scheduler.run_frame(&mut world, &mut NoInput, &mut backend, 1.0 / 60.0)?;
    }
    assert_eq!(backend.presents(), 10);
    assert!(backend.pending().is_none());

    let frames: Vec<_> = backend.frames().collect();
    assert_eq!(frames.len(), 4);
    assert_eq!(frames[3].time.frame, 9);
    assert!((frames[3].camera_position() - Vec3::new(0.0, 3.0, 8.0)).length() < 1e-5);

    // claim order: ground first, then the falling ball
    let last = backend.last_frame().unwrap();
    assert_eq!(last.records.len(), 2);
    assert_eq!(last.records[0].position, [0.0, 0.0, 0.0]);
    assert!(last.records[1].position[1] < 4.0);
    assert!(frames[0].records[1].position[1] > last.records[1].position[1]);

    // the slot-addressed copy puts the ball at the start of the sphere range
    let spheres = last.layout.range(ShapeKind::Sphere);
    assert_eq!(spheres.count, 1);
    assert_eq!(last.slots[spheres.offset as usize], last.records[1]);
    assert_eq!(last.slots.len(), SceneConfig::default().capacities.total());
    Ok(())
}

#[test]
fn byte_count_follows_the_capacity_table() -> anyhow::Result<()> {
    let mut world = demo_world()?;
    let mut scheduler = FrameScheduler::new(&PhysicsSettings::default());
    let mut backend = HeadlessBackend::default();
    scheduler.run_frame(&mut world, &mut NoInput, &mut backend, 0.0)?;

    let frame = backend.last_frame().unwrap();
    assert_eq!(backend.bytes_uploaded(), frame.byte_len() as u64);
    let record_bytes = std::mem::size_of::<scene::RenderRecord>();
    assert_eq!(record_bytes, 76);
    assert!(frame.byte_len() > (2 + SceneConfig::default().capacities.total()) * record_bytes);
    Ok(())
}
