use tracing::trace;

use crate::component::{Component, FrameContext};
use crate::error::SceneError;
use crate::registry::PrimitiveHandle;
use crate::transform::Transform;

/// Index of a game object in its [`GameObjects`] arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameObjectId(pub(crate) u32);

impl GameObjectId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub struct GameObject {
    pub name: String,
    pub transform: Transform,
    parent: Option<GameObjectId>,
    children: Vec<GameObjectId>,
    components: Vec<Component>,
}

impl GameObject {
    #[must_use]
    pub fn parent(&self) -> Option<GameObjectId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[GameObjectId] {
        &self.children
    }

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

/// Append-only arena of game objects forming a forest.
///
/// Parents are always spawned before their children, so walking the arena in index
/// order visits every parent before any of its descendants.
#[derive(Clone, Debug, Default)]
pub struct GameObjects {
    objects: Vec<GameObject>,
}

impl GameObjects {
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> GameObjectId {
        self.push(name.into(), transform, None)
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownGameObject`] if `parent` does not exist.
    pub fn spawn_child(
        &mut self,
        parent: GameObjectId,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<GameObjectId, SceneError> {
        self.get(parent)?;
        let child = self.push(name.into(), transform, Some(parent));
        self.objects[parent.index()].children.push(child);
        Ok(child)
    }

    /// Adds a component to the end of the object's list and notifies it.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownGameObject`], or whatever the component's `on_added` reports;
    /// a component that fails to attach is not added.
    pub fn attach(
        &mut self,
        id: GameObjectId,
        mut component: Component,
        ctx: &mut FrameContext<'_>,
    ) -> Result<(), SceneError> {
        let object = self.get_mut(id)?;
        component.on_added(&mut object.transform, ctx)?;
        object.components.push(component);
        Ok(())
    }

    /// Drops every component that drives `primitive`, returning how many went.
    pub fn detach_primitive(&mut self, primitive: PrimitiveHandle) -> usize {
        let mut removed = 0;
        for object in &mut self.objects {
            let before = object.components.len();
            object
                .components
                .retain(|component| component.primitive() != Some(primitive));
            removed += before - object.components.len();
        }
        removed
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownGameObject`]
    pub fn get(&self, id: GameObjectId) -> Result<&GameObject, SceneError> {
        self.objects.get(id.index()).ok_or(SceneError::UnknownGameObject(id))
    }

    /// # Errors
    ///
    /// [`SceneError::UnknownGameObject`]
    pub fn get_mut(&mut self, id: GameObjectId) -> Result<&mut GameObject, SceneError> {
        self.objects
            .get_mut(id.index())
            .ok_or(SceneError::UnknownGameObject(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (GameObjectId, &GameObject)> + '_ {
        self.objects.iter().enumerate().map(|(index, object)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = GameObjectId(index as u32);
            (id, object)
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Every descendant of `id`, depth first.
    #[must_use]
    pub fn descendants(&self, id: GameObjectId) -> Vec<GameObjectId> {
        let mut found = Vec::new();
        let mut stack: Vec<GameObjectId> = self
            .objects
            .get(id.index())
            .map(|object| object.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            found.push(next);
            stack.extend(self.objects[next.index()].children.iter().rev().copied());
        }
        found
    }

    /// # Errors
    ///
    /// The first component failure; later components are not started.
    pub fn start_all(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), SceneError> {
        for object in &mut self.objects {
            for component in &mut object.components {
                component.start(&mut object.transform, ctx)?;
            }
        }
        Ok(())
    }

    /// Drops `id` again if it is the newest root object and has no children.
    pub(crate) fn discard_newest(&mut self, id: GameObjectId) -> bool {
        let newest = self
            .objects
            .last()
            .is_some_and(|object| object.parent.is_none() && object.children.is_empty());
        if newest && id.index() + 1 == self.objects.len() {
            self.objects.pop();
            return true;
        }
        false
    }

    pub(crate) fn start_last(&mut self, id: GameObjectId, ctx: &mut FrameContext<'_>) -> Result<(), SceneError> {
        let object = self.get_mut(id)?;
        if let Some(component) = object.components.last_mut() {
            component.start(&mut object.transform, ctx)?;
        }
        Ok(())
    }

    /// Updates every component in arena order.
    ///
    /// When an object's position changes during its update, the same translation is
    /// applied to all of its descendants before they update.
    ///
    /// # Errors
    ///
    /// The first component failure.
    pub fn update_all(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), SceneError> {
        for index in 0..self.objects.len() {
            let object = &mut self.objects[index];
            let before = object.transform.position;
            for component in &mut object.components {
                component.update(&mut object.transform, ctx)?;
            }
            let delta = object.transform.position - before;

            if delta != glam::Vec3::ZERO && !object.children.is_empty() {
                #[allow(clippy::cast_possible_truncation)]
                let id = GameObjectId(index as u32);
                for descendant in self.descendants(id) {
                    self.objects[descendant.index()].transform.translate(delta);
                }
                trace!(object = index, ?delta, "cascaded translation");
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// The first component failure.
    pub fn end_all(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), SceneError> {
        for object in &mut self.objects {
            for component in &mut object.components {
                component.end(&mut object.transform, ctx)?;
            }
        }
        Ok(())
    }

    fn push(&mut self, name: String, transform: Transform, parent: Option<GameObjectId>) -> GameObjectId {
        #[allow(clippy::cast_possible_truncation)]
        let id = GameObjectId(self.objects.len() as u32);
        self.objects.push(GameObject {
            name,
            transform,
            parent,
            children: Vec::new(),
            components: Vec::new(),
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::component::Movement;
    use crate::input::InputState;
    use crate::physics_bridge::PhysicsBridge;
    use crate::registry::SceneRegistry;

    #[test]
    fn translation_cascades_to_every_descendant() {
        let mut registry = SceneRegistry::default();
        let mut bridge = PhysicsBridge::default();
        let mut ctx = FrameContext {
            registry: &mut registry,
            bridge: &mut bridge,
            input: InputState::default(),
            dt: 1.0,
        };

        let mut objects = GameObjects::default();
        let root = objects.spawn("root", Transform::IDENTITY);
        let child = objects
            .spawn_child(root, "child", Transform::from_position(Vec3::Y))
            .unwrap();
        let grandchild = objects
            .spawn_child(child, "grandchild", Transform::from_position(Vec3::Z))
            .unwrap();
        let bystander = objects.spawn("bystander", Transform::IDENTITY);

        objects
            .attach(
                root,
                Component::Movement(Movement {
                    velocity: Vec3::X,
                    ..Movement::default()
                }),
                &mut ctx,
            )
            .unwrap();
        objects.update_all(&mut ctx).unwrap();

        assert_eq!(objects.get(root).unwrap().transform.position, Vec3::X);
        assert_eq!(objects.get(child).unwrap().transform.position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(objects.get(grandchild).unwrap().transform.position, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(objects.get(bystander).unwrap().transform.position, Vec3::ZERO);
        assert_eq!(objects.descendants(root), vec![child, grandchild]);
        assert_eq!(objects.get(grandchild).unwrap().parent(), Some(child));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut objects = GameObjects::default();
        let missing = GameObjectId(7);
        assert!(matches!(
            objects.spawn_child(missing, "orphan", Transform::IDENTITY),
            Err(SceneError::UnknownGameObject(id)) if id == missing
        ));
        assert!(objects.is_empty());
    }
}
