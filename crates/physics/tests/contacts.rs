use glam::Vec3;
use physics::{ColliderShape, PhysicsEngine, PhysicsWorld, Pose};

fn world_with_ground() -> PhysicsWorld {
    let mut world = PhysicsWorld::default();
    let ground = world.add_collider(ColliderShape::Plane {
        normal: Vec3::Y,
        offset: 0.0,
    });
    world.add_static(Pose::IDENTITY, ground).unwrap();
    world
}

#[test]
fn dropped_sphere_comes_to_rest_on_ground() {
    let mut world = world_with_ground();
    let ball = ColliderShape::Sphere { radius: 0.5 };
    let collider = world.add_collider(ball);
    let body = world
        .add_body(
            Pose::from_position(Vec3::new(0.0, 3.0, 0.0)),
            ball.inertia(1.0).unwrap(),
            collider,
            0.01,
        )
        .unwrap();

    for _ in 0..600 {
        world.step(1.0 / 60.0);
    }

    let y = world.body_pose(body).unwrap().position.y;
    assert!((y - 0.5).abs() < 0.05, "sphere settled at y={y}");
    assert!(!world.is_awake(body).unwrap());
}

#[test]
fn impulse_wakes_sleeping_body() {
    let mut world = world_with_ground();
    let cube = ColliderShape::Box {
        half_extents: Vec3::splat(0.5),
    };
    let collider = world.add_collider(cube);
    let body = world
        .add_body(
            Pose::from_position(Vec3::new(0.0, 0.5, 0.0)),
            cube.inertia(1.0).unwrap(),
            collider,
            0.01,
        )
        .unwrap();

    for _ in 0..120 {
        world.step(1.0 / 60.0);
    }
    assert!(!world.is_awake(body).unwrap());

    world.apply_linear_impulse(body, Vec3::new(0.0, 5.0, 0.0)).unwrap();
    assert!(world.is_awake(body).unwrap());
    world.step(1.0 / 60.0);
    assert!(world.body_pose(body).unwrap().position.y > 0.5);
}

#[test]
fn statics_never_move() {
    let mut world = PhysicsWorld::default();
    let pillar = world.add_collider(ColliderShape::Cylinder {
        radius: 1.0,
        half_height: 2.0,
    });
    let pose = Pose::from_position(Vec3::new(1.0, 2.0, 3.0));
    let handle = world.add_static(pose, pillar).unwrap();

    for _ in 0..10 {
        world.step(0.1);
    }
    assert_eq!(world.static_pose(handle).unwrap(), pose);
}
