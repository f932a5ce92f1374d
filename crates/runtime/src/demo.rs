//! The scene the runtime plays when no other content is available.

use glam::{Quat, Vec3, Vec4};
use scene::{
    BodySpec, Camera, Component, GameObjectId, InputBinding, InputSource, InputState, InputTarget,
    Key, Movement, Primitive, PrimitiveHandle, RendererBinding, SceneError, Shape, Transform, World,
};

/// Handles the runtime reports on.
#[derive(Copy, Clone, Debug)]
pub struct DemoScene {
    pub ball: PrimitiveHandle,
    pub crate_box: PrimitiveHandle,
    pub ring: GameObjectId,
    pub cap: PrimitiveHandle,
}

/// Fills `world` with a ground plane, two falling bodies, a static ellipsoid and a
/// spinning ring carrying a capped torus.
///
/// # Errors
///
/// Whatever the world returns, most likely [`SceneError::CapacityExceeded`] when the
/// configured capacities leave no room for a shape.
pub fn populate(world: &mut World) -> Result<DemoScene, SceneError> {
    world.add_camera(Camera::looking_at(Vec3::new(0.0, 4.0, 12.0), Vec3::new(0.0, 1.0, 0.0), 16.0 / 9.0));

    world.spawn_primitive_object(
        "ground",
        Primitive::new(Shape::Plane {
            normal: Vec3::Y,
            height: 0.0,
        })
        .with_color(Vec4::new(0.4, 0.4, 0.45, 1.0)),
        Some(BodySpec::STATIC),
    )?;

    let (ball_object, ball) = world.spawn_primitive_object(
        "ball",
        Primitive::new(Shape::Sphere { radius: 0.5 })
            .at(Vec3::new(0.0, 5.0, 0.0))
            .with_color(Vec4::new(0.9, 0.2, 0.2, 1.0))
            .with_material([0.2, 0.8]),
        Some(BodySpec::dynamic(1.0)),
    )?;
    world.attach(ball_object, Component::Input(InputBinding::new(InputTarget::Body(ball))))?;

    let (_, crate_box) = world.spawn_primitive_object(
        "crate",
        Primitive::new(Shape::Box {
            half_extents: Vec3::splat(0.5),
        })
        .at(Vec3::new(2.5, 3.0, 0.0))
        .rotated(Quat::from_rotation_y(0.4)),
        Some(BodySpec::dynamic(2.0)),
    )?;

    world.spawn_primitive_object(
        "pillar",
        Primitive::new(Shape::Ellipsoid {
            radii: Vec3::new(0.6, 1.5, 0.6),
        })
        .at(Vec3::new(-3.0, 1.5, 0.0)),
        Some(BodySpec::STATIC),
    )?;

    let (ring, _) = world.spawn_primitive_object(
        "ring",
        Primitive::new(Shape::Torus {
            major_radius: 1.0,
            minor_radius: 0.15,
        })
        .at(Vec3::new(0.0, 2.0, -4.0)),
        None,
    )?;
    world.attach(
        ring,
        Component::Movement(Movement {
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::new(0.0, 45.0, 0.0),
        }),
    )?;

    let cap_object = world.spawn_child(ring, "cap", Transform::from_position(Vec3::new(0.0, 2.0, -4.0)))?;
    let cap = world.registry.add_primitive(Primitive::new(Shape::CappedTorus {
        major_radius: 0.5,
        minor_radius: 0.1,
        cap_angle: 2.0,
    }))?;
    world.attach(cap_object, Component::Renderer(RendererBinding { primitive: cap }))?;

    Ok(DemoScene {
        ball,
        crate_box,
        ring,
        cap,
    })
}

/// Holds right, then left, then lets go, a fixed number of frames each.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frame: u64,
}

impl ScriptedInput {
    pub const PHASE: u64 = 90;
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputState {
        let state = match self.frame / Self::PHASE {
            0 => InputState::default().with_key(Key::Right),
            1 => InputState::default().with_key(Key::Left),
            _ => InputState::default(),
        };
        self.frame += 1;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::{BindingState, CapacityTable, SceneConfig, ShapeKind};

    #[test]
    fn demo_uses_every_shape_kind() {
        let mut world = World::default();
        let demo = populate(&mut world).unwrap();
        for kind in ShapeKind::ALL {
            assert_eq!(world.registry.primitives_of_type(kind).count(), 1, "{kind}");
        }
        world.start().unwrap();
        assert_eq!(world.bridge.state(demo.ball), BindingState::Dynamic);
        assert_eq!(world.bridge.state(demo.crate_box), BindingState::Dynamic);
        assert_eq!(world.bridge.state(demo.cap), BindingState::Unbound);
    }

    #[test]
    fn missing_capacity_is_reported() {
        let config = SceneConfig {
            capacities: CapacityTable::default().with(ShapeKind::Torus, 0),
            ..SceneConfig::default()
        };
        let mut world = World::new(&config);
        assert!(matches!(
            populate(&mut world),
            Err(SceneError::CapacityExceeded {
                kind: ShapeKind::Torus,
                ..
            })
        ));
    }

    #[test]
    fn script_runs_through_its_phases() {
        let mut input = ScriptedInput::default();
        let states: Vec<InputState> = (0..3 * ScriptedInput::PHASE).map(|_| input.poll()).collect();
        assert!(states[0].is_down(Key::Right));
        assert!(states[usize::try_from(ScriptedInput::PHASE).unwrap()].is_down(Key::Left));
        assert_eq!(states.last().copied().unwrap(), InputState::default());
    }
}
