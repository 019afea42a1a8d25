//! # Marked Pool
//!
//! Fixed-capacity entity storage with lock-guarded deferred release.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::trace;

use super::id::PoolId;
use super::lock::PoolLock;

/// One slot of a [`MarkedPool`].
#[derive(Debug)]
struct Slot<T> {
    /// The stored entry, `None` when the slot is free.
    value: Option<T>,
    /// Bumped on every physical destruction.
    generation: u32,
    /// Outstanding release locks.
    locks: u32,
    /// Release was requested while locked.
    pending_release: bool,
}

impl<T> Slot<T> {
    const fn empty() -> Self {
        Self {
            value: None,
            generation: 0,
            locks: 0,
            pending_release: false,
        }
    }
}

/// Outcome of [`MarkedPool::release`].
#[derive(Debug, PartialEq, Eq)]
pub enum Release<T> {
    /// The entry was physically destroyed by this call.
    Destroyed(T),
    /// The entry is locked; it is marked and will be destroyed by the
    /// final [`MarkedPool::unlock`].
    Deferred,
    /// The id did not name a live entry. Nothing happened.
    Missing,
}

impl<T> Release<T> {
    /// Returns true if the entry is gone after the call.
    #[inline]
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed(_))
    }
}

/// A bounded pool of entries addressed by stable [`PoolId`]s.
///
/// `create` always takes the lowest free slot. An entry that is locked
/// (see [`ScopedReleaseLock`](super::ScopedReleaseLock)) is never destroyed
/// out from under its lock holder: releasing it only marks it, and the
/// unlock that brings the counter back to zero performs the destruction.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Locks exist for re-entrancy within one
/// thread of control, not for concurrency.
///
/// # Example
///
/// ```rust
/// use meridian_core::pool::{MarkedPool, Release};
///
/// let mut pool: MarkedPool<&str> = MarkedPool::new(4);
/// let id = pool.create("zone").unwrap();
///
/// pool.lock(id);
/// assert_eq!(pool.release(id), Release::Deferred);
/// assert!(pool.get(id).is_some());
///
/// assert!(pool.unlock(id));
/// assert!(pool.get(id).is_none());
/// ```
#[derive(Debug)]
pub struct MarkedPool<T> {
    /// The slot array, sized once.
    slots: Box<[Slot<T>]>,
    /// Free slot indices, lowest first.
    free: BinaryHeap<Reverse<u32>>,
    /// Number of occupied slots (pending releases included).
    allocated: usize,
}

impl<T> MarkedPool<T> {
    /// Creates a new pool with the specified capacity.
    ///
    /// All slots are pre-allocated upfront.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit below `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity < u32::MAX as usize,
            "Capacity must fit in a 32-bit slot index"
        );

        let slots: Vec<Slot<T>> = (0..capacity).map(|_| Slot::empty()).collect();
        #[allow(clippy::cast_possible_truncation)]
        let free: BinaryHeap<Reverse<u32>> = (0..capacity as u32).map(Reverse).collect();

        Self {
            slots: slots.into_boxed_slice(),
            free,
            allocated: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.allocated
    }

    /// Returns true if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Valid slot index range, `(lower, upper)` with `upper` exclusive.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> (usize, usize) {
        (0, self.slots.len())
    }

    /// Stores `value` in the lowest free slot.
    ///
    /// Returns `None` (the INVALID id) when every slot is taken.
    pub fn create(&mut self, value: T) -> Option<PoolId> {
        let Reverse(index) = self.free.pop()?;
        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.value.is_none(), "free list handed out an occupied slot");

        slot.value = Some(value);
        slot.locks = 0;
        slot.pending_release = false;
        self.allocated += 1;

        Some(PoolId::new(index, slot.generation))
    }

    /// Looks up a live entry.
    ///
    /// Entries marked for deferred release are still returned until they
    /// are physically destroyed.
    #[inline]
    #[must_use]
    pub fn get(&self, id: PoolId) -> Option<&T> {
        self.slot(id)?.value.as_ref()
    }

    /// Mutable lookup of a live entry.
    #[inline]
    pub fn get_mut(&mut self, id: PoolId) -> Option<&mut T> {
        self.slot_mut(id)?.value.as_mut()
    }

    /// Resolves a raw slot index to the id of its current occupant.
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<PoolId> {
        let slot = self.slots.get(index)?;
        slot.value.as_ref()?;
        #[allow(clippy::cast_possible_truncation)]
        let index = index as u32;
        Some(PoolId::new(index, slot.generation))
    }

    /// Returns true if `id` names a live entry.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: PoolId) -> bool {
        self.get(id).is_some()
    }

    /// Number of outstanding locks on `id`, zero for unknown ids.
    #[must_use]
    pub fn lock_count(&self, id: PoolId) -> u32 {
        self.slot(id).map_or(0, |slot| slot.locks)
    }

    /// Returns true if `id` was released while locked and awaits its
    /// final unlock.
    #[must_use]
    pub fn is_pending_release(&self, id: PoolId) -> bool {
        self.slot(id).is_some_and(|slot| slot.pending_release)
    }

    /// Increments the lock counter of `id`.
    ///
    /// Returns false (and does nothing) if `id` is not live.
    pub fn lock(&mut self, id: PoolId) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.locks += 1;
                true
            }
            None => false,
        }
    }

    /// Decrements the lock counter of `id`.
    ///
    /// Returns true if this call brought the counter to zero on an entry
    /// that was pending release, i.e. the entry was destroyed now.
    /// Unlocking an unknown id or an id whose counter is already zero is
    /// a no-op returning false.
    pub fn unlock(&mut self, id: PoolId) -> bool {
        self.unlock_reclaim(id).is_some()
    }

    /// Same as [`unlock`](Self::unlock), but hands back the destroyed
    /// entry instead of dropping it.
    pub fn unlock_reclaim(&mut self, id: PoolId) -> Option<T> {
        let slot = self.slot_mut(id)?;
        if slot.locks == 0 {
            return None;
        }
        slot.locks -= 1;
        if slot.locks == 0 && slot.pending_release {
            trace!(slot = id.index(), "deferred release completed on unlock");
            return Some(self.destroy(id.index()));
        }
        None
    }

    /// Requests destruction of `id`.
    ///
    /// Unlocked entries are destroyed immediately. Locked entries are only
    /// marked; callers must not assume the entry is gone after this call.
    pub fn release(&mut self, id: PoolId) -> Release<T> {
        let Some(slot) = self.slot_mut(id) else {
            return Release::Missing;
        };
        if slot.locks > 0 {
            slot.pending_release = true;
            trace!(slot = id.index(), locks = slot.locks, "release deferred");
            return Release::Deferred;
        }
        Release::Destroyed(self.destroy(id.index()))
    }

    /// Releases every entry, deferring the locked ones.
    pub fn clear(&mut self) {
        for index in 0..self.slots.len() {
            if let Some(id) = self.id_at(index) {
                let _ = self.release(id);
            }
        }
    }

    /// Iterates over all live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = PoolId::new(index as u32, slot.generation);
            slot.value.as_ref().map(|value| (id, value))
        })
    }

    /// Iterates mutably over all live entries in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PoolId, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = PoolId::new(index as u32, slot.generation);
            slot.value.as_mut().map(|value| (id, value))
        })
    }

    fn slot(&self, id: PoolId) -> Option<&Slot<T>> {
        if id.is_null() {
            return None;
        }
        let slot = self.slots.get(id.index() as usize)?;
        (slot.generation == id.generation() && slot.value.is_some()).then_some(slot)
    }

    fn slot_mut(&mut self, id: PoolId) -> Option<&mut Slot<T>> {
        if id.is_null() {
            return None;
        }
        let slot = self.slots.get_mut(id.index() as usize)?;
        (slot.generation == id.generation() && slot.value.is_some()).then_some(slot)
    }

    /// Physically destroys the occupant of `index`. The caller has checked
    /// that the slot is occupied.
    fn destroy(&mut self, index: u32) -> T {
        let slot = &mut self.slots[index as usize];
        slot.locks = 0;
        slot.pending_release = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.allocated -= 1;
        self.free.push(Reverse(index));
        match slot.value.take() {
            Some(value) => value,
            None => unreachable!("destroy called on a free slot"),
        }
    }
}

impl<T> PoolLock for MarkedPool<T> {
    fn lock(&mut self, id: PoolId) -> bool {
        MarkedPool::lock(self, id)
    }

    fn unlock(&mut self, id: PoolId) -> bool {
        MarkedPool::unlock(self, id)
    }
}
