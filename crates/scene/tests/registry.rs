use glam::{Quat, Vec3};
use scene::{
    CapacityTable, Primitive, RenderDataEncoder, SceneError, SceneRegistry, Shape, ShapeKind,
};

fn sphere(radius: f32, position: Vec3) -> Primitive {
    Primitive::new(Shape::Sphere { radius }).at(position)
}

#[test]
fn two_sphere_scene_end_to_end() {
    let mut registry = SceneRegistry::new(&CapacityTable::empty().with(ShapeKind::Sphere, 2));

    let s1 = registry.add_primitive(sphere(1.0, Vec3::ZERO)).unwrap();
    let s2 = registry.add_primitive(sphere(2.0, Vec3::new(1.0, 0.0, 0.0))).unwrap();
    assert_eq!(s1.slot.index(), 0);
    assert_eq!(s2.slot.index(), 1);

    let err = registry
        .add_primitive(sphere(3.0, Vec3::new(2.0, 0.0, 0.0)))
        .unwrap_err();
    assert!(matches!(
        err,
        SceneError::CapacityExceeded {
            kind: ShapeKind::Sphere,
            capacity: 2
        }
    ));

    let radii: Vec<f32> = registry.all_primitives().map(|p| p.sdf_options().x).collect();
    assert_eq!(radii, vec![1.0, 2.0]);

    let mut encoder = RenderDataEncoder::new();
    let records = encoder.encode_registry(&registry);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].options, [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(records[1].options, [2.0, 0.0, 0.0, 0.0]);
    assert_eq!(records[0].position, [0.0, 0.0, 0.0]);
    assert_eq!(records[1].position, [1.0, 0.0, 0.0]);
    assert_eq!(records[0].rotation, [0.0, 0.0, 0.0]);
    assert_eq!(records[1].rotation, [0.0, 0.0, 0.0]);
}

#[test]
fn every_kind_fills_to_capacity_and_no_further() {
    let capacities = CapacityTable::empty()
        .with(ShapeKind::Sphere, 3)
        .with(ShapeKind::Box, 1)
        .with(ShapeKind::Plane, 2)
        .with(ShapeKind::Ellipsoid, 4)
        .with(ShapeKind::Torus, 0)
        .with(ShapeKind::CappedTorus, 5);
    let mut registry = SceneRegistry::new(&capacities);

    for kind in ShapeKind::ALL {
        let capacity = capacities.get(kind);
        for _ in 0..capacity {
            registry.add_primitive(Primitive::placeholder(kind)).unwrap();
        }
        let before = registry.len();
        let err = registry.add_primitive(Primitive::placeholder(kind)).unwrap_err();
        assert!(
            matches!(err, SceneError::CapacityExceeded { kind: k, capacity: c } if k == kind && c == capacity),
            "{kind}: {err}"
        );
        assert_eq!(registry.pool(kind).claimed_count(), capacity);
        assert_eq!(registry.len(), before);
    }
    assert_eq!(registry.len(), capacities.total());
}

#[test]
fn encoding_is_idempotent() {
    let mut registry = SceneRegistry::default();
    let rng = fastrand::Rng::with_seed(42);
    for kind in ShapeKind::ALL {
        for _ in 0..4 {
            let primitive = Primitive::placeholder(kind)
                .at(Vec3::new(rng.f32(), rng.f32(), rng.f32()) * 10.0)
                .rotated(Quat::from_euler(
                    glam::EulerRot::YXZ,
                    rng.f32() * 6.0,
                    rng.f32() * 6.0,
                    rng.f32() * 6.0,
                ));
            registry.add_primitive(primitive).unwrap();
        }
    }

    let mut encoder = RenderDataEncoder::new();
    let first = encoder.encode_registry(&registry).to_vec();
    let first_bytes = encoder.as_bytes().to_vec();
    let second = encoder.encode_registry(&registry).to_vec();
    assert_eq!(first, second);
    assert_eq!(first_bytes, encoder.as_bytes());

    let mut fresh = RenderDataEncoder::new();
    assert_eq!(fresh.encode_registry(&registry), first.as_slice());
}

#[test]
fn claim_order_is_stable_across_encodes() {
    let mut registry = SceneRegistry::default();
    let a = Primitive::new(Shape::Box {
        half_extents: Vec3::ONE,
    });
    let b = sphere(0.5, Vec3::Y);
    let c = Primitive::new(Shape::Torus {
        major_radius: 1.0,
        minor_radius: 0.1,
    });
    for primitive in [a, b, c] {
        registry.add_primitive(primitive).unwrap();
    }

    let mut encoder = RenderDataEncoder::new();
    for _ in 0..3 {
        let records = encoder.encode_registry(&registry);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].options, a.sdf_options().to_array());
        assert_eq!(records[1].options, b.sdf_options().to_array());
        assert_eq!(records[2].options, c.sdf_options().to_array());
    }
}

#[test]
fn removal_keeps_remaining_order() {
    let mut registry = SceneRegistry::default();
    let handles: Vec<_> = (0..4)
        .map(|i| registry.add_primitive(sphere(1.0, Vec3::X * i as f32)).unwrap())
        .collect();
    registry.remove_primitive(handles[1]).unwrap();

    let xs: Vec<f32> = registry.all_primitives().map(|p| p.transform.position.x).collect();
    assert_eq!(xs, vec![0.0, 2.0, 3.0]);

    // the freed slot is the first one handed out again, but the new primitive goes last
    let reused = registry.add_primitive(sphere(1.0, Vec3::X * 9.0)).unwrap();
    assert_eq!(reused.slot, handles[1].slot);
    let xs: Vec<f32> = registry.all_primitives().map(|p| p.transform.position.x).collect();
    assert_eq!(xs, vec![0.0, 2.0, 3.0, 9.0]);
}
