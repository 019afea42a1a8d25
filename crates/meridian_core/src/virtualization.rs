//! # Identifier Virtualization
//!
//! Per-consumer renumbering of pool entries.
//!
//! A consumer (usually a connected player) can only address a limited
//! number of entries through its own slot numbers. Each slot can hold an
//! *external* value (a global pool id mapped into the consumer's space) and
//! an *internal* value (an entry private to the consumer). The two sides are
//! reserved and released independently; a slot is handed out again only
//! once both sides are unset.
//!
//! Lookups are linear scans. That is fine for the small fixed capacities
//! this table is built for; large tables would want a free list instead.

/// One slot of an [`IdTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct IdSlot<E, I> {
    external: Option<E>,
    internal: Option<I>,
}

impl<E, I> IdSlot<E, I> {
    const UNSET: Self = Self {
        external: None,
        internal: None,
    };

    const fn is_free(&self) -> bool {
        self.external.is_none() && self.internal.is_none()
    }
}

/// Fixed-size bidirectional mapping between consumer slots and values.
///
/// # Example
///
/// ```rust
/// use meridian_core::IdTable;
///
/// let mut table: IdTable<u32, u32> = IdTable::new(4);
/// assert_eq!(table.reserve_external(5), Some(0));
/// assert_eq!(table.reserve_internal(7), Some(1));
///
/// table.release_external(5);
/// assert_eq!(table.reserve_external(9), Some(0));
/// ```
#[derive(Clone, Debug)]
pub struct IdTable<E, I> {
    slots: Box<[IdSlot<E, I>]>,
}

impl<E: Copy + PartialEq, I: Copy + PartialEq> IdTable<E, I> {
    /// Creates a table with `capacity` unset slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![IdSlot::UNSET; capacity].into_boxed_slice(),
        }
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots with at least one side set.
    #[must_use]
    pub fn used(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_free()).count()
    }

    /// Lowest slot with both sides unset.
    fn find_unused(&self) -> Option<usize> {
        self.slots.iter().position(IdSlot::is_free)
    }

    /// Maps `value` onto the lowest fully free slot, as the external side.
    ///
    /// Returns `None` when every slot has at least one side set.
    pub fn reserve_external(&mut self, value: E) -> Option<usize> {
        let slot = self.find_unused()?;
        self.slots[slot].external = Some(value);
        Some(slot)
    }

    /// Maps `value` onto the lowest fully free slot, as the internal side.
    ///
    /// Returns `None` when every slot has at least one side set.
    pub fn reserve_internal(&mut self, value: I) -> Option<usize> {
        let slot = self.find_unused()?;
        self.slots[slot].internal = Some(value);
        Some(slot)
    }

    /// External value stored at `slot`.
    #[must_use]
    pub fn external_at(&self, slot: usize) -> Option<E> {
        self.slots.get(slot)?.external
    }

    /// Internal value stored at `slot`.
    #[must_use]
    pub fn internal_at(&self, slot: usize) -> Option<I> {
        self.slots.get(slot)?.internal
    }

    /// Slot holding `value` on the external side.
    #[must_use]
    pub fn slot_of_external(&self, value: E) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.external == Some(value))
    }

    /// Slot holding `value` on the internal side.
    #[must_use]
    pub fn slot_of_internal(&self, value: I) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.internal == Some(value))
    }

    /// Clears the external side of the slot holding `value`.
    ///
    /// The slot only becomes reusable once its internal side is unset too.
    /// Returns the slot that was cleared, or `None` if `value` was not
    /// mapped (a no-op).
    pub fn release_external(&mut self, value: E) -> Option<usize> {
        let slot = self.slot_of_external(value)?;
        self.slots[slot].external = None;
        Some(slot)
    }

    /// Clears the internal side of the slot holding `value`.
    ///
    /// Returns the slot that was cleared, or `None` if `value` was not
    /// mapped (a no-op).
    pub fn release_internal(&mut self, value: I) -> Option<usize> {
        let slot = self.slot_of_internal(value)?;
        self.slots[slot].internal = None;
        Some(slot)
    }

    /// Unsets both sides of every slot.
    pub fn reset(&mut self) {
        self.slots.fill(IdSlot::UNSET);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sides_share_the_lowest_free_slot() {
        let mut table: IdTable<u32, u32> = IdTable::new(4);

        assert_eq!(table.reserve_external(5), Some(0));
        assert_eq!(table.reserve_internal(7), Some(1));
        assert_eq!(table.release_external(5), Some(0));
        assert_eq!(table.reserve_external(9), Some(0));

        assert_eq!(table.external_at(0), Some(9));
        assert_eq!(table.internal_at(1), Some(7));
        assert_eq!(table.slot_of_internal(7), Some(1));
    }

    #[test]
    fn test_half_released_slot_is_not_reclaimed() {
        let mut table: IdTable<u32, u32> = IdTable::new(2);

        assert_eq!(table.reserve_external(1), Some(0));
        assert_eq!(table.reserve_external(2), Some(1));
        assert_eq!(table.reserve_internal(3), None);

        table.release_external(1);
        assert_eq!(table.reserve_internal(3), Some(0));
        assert_eq!(table.used(), 2);
    }

    #[test]
    fn test_release_of_unknown_value_is_noop() {
        let mut table: IdTable<u32, u32> = IdTable::new(2);
        table.reserve_internal(4);

        assert_eq!(table.release_external(4), None);
        assert_eq!(table.release_internal(5), None);
        assert_eq!(table.internal_at(0), Some(4));
    }

    #[test]
    fn test_out_of_range_lookups() {
        let table: IdTable<u32, u32> = IdTable::new(2);
        assert_eq!(table.external_at(9), None);
        assert_eq!(table.internal_at(9), None);
        assert_eq!(table.slot_of_external(0), None);
    }

    #[test]
    fn test_reset_unsets_everything() {
        let mut table: IdTable<u32, u32> = IdTable::new(3);
        table.reserve_external(1);
        table.reserve_internal(2);
        table.reset();

        assert_eq!(table.used(), 0);
        for slot in 0..table.capacity() {
            assert_eq!(table.external_at(slot), None);
            assert_eq!(table.internal_at(slot), None);
        }
    }
}
