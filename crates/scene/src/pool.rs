//! Fixed-capacity storage for primitives of one shape kind.

use tracing::{debug, warn};

use crate::error::SceneError;
use crate::primitive::Primitive;
use crate::shape::ShapeKind;

/// Index of a slot inside one pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub(crate) u32);

impl SlotIndex {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// `capacity` slots plus a parallel claimed bitmap.
///
/// Slots are never moved or compacted, so a slot index stays valid for as long as the
/// slot is claimed. Every release bumps the slot's generation, which lets the registry
/// tell a reused slot apart from the one a stale handle pointed at.
#[derive(Debug, Clone)]
pub struct PrimitiveSlotPool {
    kind: ShapeKind,
    slots: Box<[Primitive]>,
    claimed: Box<[bool]>,
    generations: Box<[u32]>,
    claimed_count: usize,
}

impl PrimitiveSlotPool {
    #[must_use]
    pub fn new(kind: ShapeKind, capacity: usize) -> Self {
        Self {
            kind,
            slots: vec![Primitive::placeholder(kind); capacity].into_boxed_slice(),
            claimed: vec![false; capacity].into_boxed_slice(),
            generations: vec![0; capacity].into_boxed_slice(),
            claimed_count: 0,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn claimed_count(&self) -> usize {
        self.claimed_count
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.claimed_count == self.capacity()
    }

    /// Stores `primitive` in the lowest unclaimed slot.
    ///
    /// # Errors
    ///
    /// [`SceneError::CapacityExceeded`] when every slot is claimed. The pool is left
    /// exactly as it was.
    pub fn try_claim(&mut self, primitive: Primitive) -> Result<SlotIndex, SceneError> {
        debug_assert_eq!(primitive.kind(), self.kind, "primitive routed to the wrong pool");

        let Some(index) = self.claimed.iter().position(|claimed| !claimed) else {
            warn!(kind = %self.kind, capacity = self.capacity(), "slot pool is full");
            return Err(SceneError::CapacityExceeded {
                kind: self.kind,
                capacity: self.capacity(),
            });
        };

        self.slots[index] = primitive;
        self.claimed[index] = true;
        self.claimed_count += 1;
        debug!(kind = %self.kind, slot = index, "claimed slot");

        #[allow(clippy::cast_possible_truncation)]
        let slot = SlotIndex(index as u32);
        Ok(slot)
    }

    /// Unclaims `slot` and returns the primitive it held.
    ///
    /// # Errors
    ///
    /// [`SceneError::SlotNotClaimed`] if the slot is out of range or already free.
    pub fn release(&mut self, slot: SlotIndex) -> Result<Primitive, SceneError> {
        if !self.is_claimed(slot) {
            return Err(SceneError::SlotNotClaimed {
                kind: self.kind,
                slot,
            });
        }
        let index = slot.index();
        let primitive = std::mem::replace(&mut self.slots[index], Primitive::placeholder(self.kind));
        self.claimed[index] = false;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.claimed_count -= 1;
        debug!(kind = %self.kind, slot = index, "released slot");
        Ok(primitive)
    }

    #[must_use]
    pub fn is_claimed(&self, slot: SlotIndex) -> bool {
        self.claimed.get(slot.index()).copied().unwrap_or(false)
    }

    /// Generation of `slot`, or `None` when out of range.
    #[must_use]
    pub fn generation(&self, slot: SlotIndex) -> Option<u32> {
        self.generations.get(slot.index()).copied()
    }

    #[must_use]
    pub fn get(&self, slot: SlotIndex) -> Option<&Primitive> {
        if self.is_claimed(slot) {
            self.slots.get(slot.index())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, slot: SlotIndex) -> Option<&mut Primitive> {
        if self.is_claimed(slot) {
            self.slots.get_mut(slot.index())
        } else {
            None
        }
    }

    /// Claimed slots in slot order.
    pub fn all(&self) -> impl Iterator<Item = (SlotIndex, &Primitive)> + '_ {
        self.slots
            .iter()
            .zip(self.claimed.iter())
            .enumerate()
            .filter(|(_, (_, claimed))| **claimed)
            .map(|(index, (primitive, _))| {
                #[allow(clippy::cast_possible_truncation)]
                let slot = SlotIndex(index as u32);
                (slot, primitive)
            })
    }

    /// Every slot with its claimed flag, claimed or not.
    pub fn slots(&self) -> impl Iterator<Item = (bool, &Primitive)> + '_ {
        self.claimed.iter().copied().zip(self.slots.iter())
    }

    pub(crate) fn slots_raw(&self) -> &[Primitive] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::shape::Shape;

    fn sphere(radius: f32) -> Primitive {
        Primitive::new(Shape::Sphere { radius })
    }

    #[test]
    fn claims_first_free_slot() {
        let mut pool = PrimitiveSlotPool::new(ShapeKind::Sphere, 3);
        let a = pool.try_claim(sphere(1.0)).unwrap();
        let b = pool.try_claim(sphere(2.0)).unwrap();
        let c = pool.try_claim(sphere(3.0)).unwrap();
        assert_eq!([a.index(), b.index(), c.index()], [0, 1, 2]);

        pool.release(b).unwrap();
        let d = pool.try_claim(sphere(4.0)).unwrap();
        assert_eq!(d, b);
        assert_eq!(pool.get(d).unwrap().sdf_options().x, 4.0);
    }

    #[test]
    fn full_pool_is_left_untouched() {
        let mut pool = PrimitiveSlotPool::new(ShapeKind::Sphere, 1);
        pool.try_claim(sphere(1.0)).unwrap();
        let before = pool.clone();

        let err = pool.try_claim(sphere(2.0)).unwrap_err();
        assert!(matches!(
            err,
            SceneError::CapacityExceeded {
                kind: ShapeKind::Sphere,
                capacity: 1
            }
        ));
        assert_eq!(pool.claimed_count(), 1);
        assert_eq!(pool.claimed, before.claimed);
        assert_eq!(pool.slots, before.slots);
    }

    #[test]
    fn zero_capacity_always_fails() {
        let mut pool = PrimitiveSlotPool::new(ShapeKind::Torus, 0);
        assert!(pool.is_full());
        assert!(pool.try_claim(Primitive::placeholder(ShapeKind::Torus)).is_err());
    }

    #[test]
    fn release_bumps_generation_and_resets_slot() {
        let mut pool = PrimitiveSlotPool::new(ShapeKind::Sphere, 2);
        let slot = pool.try_claim(sphere(1.0).at(Vec3::X)).unwrap();
        assert_eq!(pool.generation(slot), Some(0));

        let released = pool.release(slot).unwrap();
        assert_eq!(released.transform.position, Vec3::X);
        assert_eq!(pool.generation(slot), Some(1));
        assert!(!pool.is_claimed(slot));
        assert!(pool.get(slot).is_none());
        assert!(matches!(
            pool.release(slot),
            Err(SceneError::SlotNotClaimed { .. })
        ));
    }

    #[test]
    fn all_skips_unclaimed() {
        let mut pool = PrimitiveSlotPool::new(ShapeKind::Sphere, 4);
        let slots: Vec<_> = (0..4).map(|i| pool.try_claim(sphere(i as f32)).unwrap()).collect();
        pool.release(slots[1]).unwrap();
        pool.release(slots[3]).unwrap();
        let live: Vec<_> = pool.all().map(|(slot, _)| slot.index()).collect();
        assert_eq!(live, vec![0, 2]);
        assert_eq!(pool.slots().count(), 4);
    }
}
