use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::CameraId;
use crate::error::SceneError;
use crate::pool::{PrimitiveSlotPool, SlotIndex};
use crate::primitive::Primitive;
use crate::shape::ShapeKind;

/// Reference to a primitive registered in a [`SceneRegistry`].
///
/// A handle outlives its primitive harmlessly: once the slot is released (and possibly
/// reclaimed) the generation no longer matches and lookups fail with
/// [`SceneError::StalePrimitive`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveHandle {
    pub kind: ShapeKind,
    pub slot: SlotIndex,
    pub generation: u32,
}

/// Slot count per shape kind, fixed when a registry is built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, usize>", into = "BTreeMap<String, usize>")]
pub struct CapacityTable([usize; ShapeKind::COUNT]);

impl Default for CapacityTable {
    fn default() -> Self {
        Self([32, 32, 8, 16, 16, 16])
    }
}

impl CapacityTable {
    /// A table with every kind at zero.
    #[must_use]
    pub const fn empty() -> Self {
        Self([0; ShapeKind::COUNT])
    }

    #[must_use]
    pub fn with(mut self, kind: ShapeKind, capacity: usize) -> Self {
        self.0[kind.index()] = capacity;
        self
    }

    #[must_use]
    pub fn get(&self, kind: ShapeKind) -> usize {
        self.0[kind.index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}

impl TryFrom<BTreeMap<String, usize>> for CapacityTable {
    type Error = SceneError;

    fn try_from(map: BTreeMap<String, usize>) -> Result<Self, Self::Error> {
        map.into_iter().try_fold(Self::default(), |table, (name, capacity)| {
            Ok(table.with(name.parse()?, capacity))
        })
    }
}

impl From<CapacityTable> for BTreeMap<String, usize> {
    fn from(table: CapacityTable) -> Self {
        ShapeKind::ALL
            .into_iter()
            .map(|kind| (kind.name().to_owned(), table.get(kind)))
            .collect()
    }
}

/// Every primitive in the scene, stored per kind, plus the claim-order list the
/// encoder walks.
#[derive(Debug, Clone)]
pub struct SceneRegistry {
    pools: [PrimitiveSlotPool; ShapeKind::COUNT],
    order: Vec<PrimitiveHandle>,
    active_camera: Option<CameraId>,
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new(&CapacityTable::default())
    }
}

impl SceneRegistry {
    #[must_use]
    pub fn new(capacities: &CapacityTable) -> Self {
        Self {
            pools: ShapeKind::ALL.map(|kind| PrimitiveSlotPool::new(kind, capacities.get(kind))),
            order: Vec::with_capacity(capacities.total()),
            active_camera: None,
        }
    }

    /// Claims a slot in the pool matching the primitive's kind.
    ///
    /// # Errors
    ///
    /// [`SceneError::CapacityExceeded`] when that pool is full; nothing changes.
    pub fn add_primitive(&mut self, primitive: Primitive) -> Result<PrimitiveHandle, SceneError> {
        let kind = primitive.kind();
        let pool = &mut self.pools[kind.index()];
        let slot = pool.try_claim(primitive)?;
        let handle = PrimitiveHandle {
            kind,
            slot,
            generation: pool.generation(slot).unwrap_or_default(),
        };
        self.order.push(handle);
        Ok(handle)
    }

    /// Unclaims the primitive's slot and drops it from the claim order.
    ///
    /// # Errors
    ///
    /// [`SceneError::StalePrimitive`] if the handle no longer refers to a live primitive.
    pub fn remove_primitive(&mut self, handle: PrimitiveHandle) -> Result<Primitive, SceneError> {
        self.check(handle)?;
        let position = self
            .order
            .iter()
            .position(|h| *h == handle)
            .ok_or(SceneError::StalePrimitive(handle))?;
        let primitive = self.pools[handle.kind.index()].release(handle.slot)?;
        self.order.remove(position);
        debug!(?handle, "removed primitive");
        Ok(primitive)
    }

    #[must_use]
    pub fn contains(&self, handle: PrimitiveHandle) -> bool {
        self.check(handle).is_ok()
    }

    /// # Errors
    ///
    /// [`SceneError::StalePrimitive`] for removed or reused slots.
    pub fn get(&self, handle: PrimitiveHandle) -> Result<&Primitive, SceneError> {
        self.check(handle)?;
        self.pools[handle.kind.index()]
            .get(handle.slot)
            .ok_or(SceneError::StalePrimitive(handle))
    }

    /// # Errors
    ///
    /// [`SceneError::StalePrimitive`] for removed or reused slots.
    pub fn get_mut(&mut self, handle: PrimitiveHandle) -> Result<&mut Primitive, SceneError> {
        self.check(handle)?;
        self.pools[handle.kind.index()]
            .get_mut(handle.slot)
            .ok_or(SceneError::StalePrimitive(handle))
    }

    /// Live primitives in claim order.
    pub fn all_primitives(&self) -> impl ExactSizeIterator<Item = &Primitive> + '_ {
        self.order.iter().map(|handle| self.live(*handle))
    }

    /// Handles of live primitives in claim order.
    #[must_use]
    pub fn handles(&self) -> &[PrimitiveHandle] {
        &self.order
    }

    /// Live primitives of one kind, in claim order.
    pub fn primitives_of_type(
        &self,
        kind: ShapeKind,
    ) -> impl Iterator<Item = (PrimitiveHandle, &Primitive)> + '_ {
        self.order
            .iter()
            .filter(move |handle| handle.kind == kind)
            .map(|handle| (*handle, self.live(*handle)))
    }

    #[must_use]
    pub fn pool(&self, kind: ShapeKind) -> &PrimitiveSlotPool {
        &self.pools[kind.index()]
    }

    #[must_use]
    pub fn pools(&self) -> &[PrimitiveSlotPool; ShapeKind::COUNT] {
        &self.pools
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn active_camera(&self) -> Option<CameraId> {
        self.active_camera
    }

    pub fn set_active_camera(&mut self, camera: Option<CameraId>) {
        self.active_camera = camera;
    }

    fn check(&self, handle: PrimitiveHandle) -> Result<(), SceneError> {
        let pool = &self.pools[handle.kind.index()];
        if pool.is_claimed(handle.slot) && pool.generation(handle.slot) == Some(handle.generation) {
            Ok(())
        } else {
            Err(SceneError::StalePrimitive(handle))
        }
    }

    // Handles in `order` always point at claimed slots.
    fn live(&self, handle: PrimitiveHandle) -> &Primitive {
        &self.pools[handle.kind.index()].slots_raw()[handle.slot.index()]
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::shape::Shape;

    fn sphere_at(x: f32) -> Primitive {
        Primitive::new(Shape::Sphere { radius: 1.0 }).at(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn capacity_table_reads_names() {
        let table: CapacityTable = serde_json::from_str(r#"{"sphere": 2, "Capped_Torus": 1}"#).unwrap();
        assert_eq!(table.get(ShapeKind::Sphere), 2);
        assert_eq!(table.get(ShapeKind::CappedTorus), 1);
        assert_eq!(table.get(ShapeKind::Box), 32);

        let err = serde_json::from_str::<CapacityTable>(r#"{"cone": 3}"#).unwrap_err();
        assert!(err.to_string().contains("cone"), "{err}");
    }

    #[test]
    fn routes_by_kind_and_keeps_claim_order() {
        let mut registry = SceneRegistry::default();
        let a = registry.add_primitive(sphere_at(0.0)).unwrap();
        let b = registry
            .add_primitive(Primitive::new(Shape::Box {
                half_extents: Vec3::ONE,
            }))
            .unwrap();
        let c = registry.add_primitive(sphere_at(2.0)).unwrap();

        assert_eq!(registry.handles(), &[a, b, c]);
        assert_eq!(b.kind, ShapeKind::Box);
        assert_eq!(b.slot.index(), 0);
        assert_eq!(c.slot.index(), 1);

        let spheres: Vec<_> = registry.primitives_of_type(ShapeKind::Sphere).map(|(h, _)| h).collect();
        assert_eq!(spheres, vec![a, c]);
        assert_eq!(registry.pool(ShapeKind::Sphere).claimed_count(), 2);
    }

    #[test]
    fn removal_invalidates_handle_even_after_reuse() {
        let mut registry = SceneRegistry::default();
        let a = registry.add_primitive(sphere_at(0.0)).unwrap();
        let b = registry.add_primitive(sphere_at(1.0)).unwrap();

        registry.remove_primitive(a).unwrap();
        assert_eq!(registry.handles(), &[b]);
        assert!(matches!(registry.get(a), Err(SceneError::StalePrimitive(h)) if h == a));

        let reused = registry.add_primitive(sphere_at(5.0)).unwrap();
        assert_eq!(reused.slot, a.slot);
        assert_ne!(reused.generation, a.generation);
        assert!(registry.get(a).is_err());
        assert!(registry.remove_primitive(a).is_err());
        assert_eq!(registry.get(reused).unwrap().transform.position.x, 5.0);
        assert_eq!(registry.handles(), &[b, reused]);
    }

    #[test]
    fn failed_add_leaves_order_alone() {
        let mut registry = SceneRegistry::new(&CapacityTable::empty().with(ShapeKind::Sphere, 1));
        registry.add_primitive(sphere_at(0.0)).unwrap();
        assert!(registry.add_primitive(sphere_at(1.0)).is_err());
        assert_eq!(registry.len(), 1);
        assert!(registry
            .add_primitive(Primitive::placeholder(ShapeKind::Plane))
            .is_err());
    }
}
