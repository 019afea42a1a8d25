//! # Checking Set
//!
//! Sparse set of pool ids that opted into per-tick evaluation.
//!
//! Per-tick cost is proportional to the number of opted-in ids, not to the
//! pool capacity: membership is O(1) through the sparse index array and
//! iteration walks the dense array only.

use crate::pool::PoolId;

/// Marks a sparse slot with no dense entry.
const EMPTY: u32 = u32::MAX;

/// Fixed-capacity sparse set of [`PoolId`]s.
///
/// Keyed by slot index, so at most one generation of a slot can be present
/// at a time. Lookups compare the full id, which makes a stale id test as
/// absent even while a newer occupant of the same slot is in the set.
///
/// Removal swaps the last dense entry into the hole, so iteration order is
/// arbitrary. It is stable as long as the set is not modified.
#[derive(Clone, Debug)]
pub struct CheckingSet {
    /// `sparse[slot]` is the dense position of that slot, or [`EMPTY`].
    sparse: Box<[u32]>,
    /// Packed member ids.
    dense: Vec<PoolId>,
}

impl CheckingSet {
    /// Creates an empty set able to hold ids with slot index below `capacity`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            sparse: vec![EMPTY; capacity].into_boxed_slice(),
            dense: Vec::with_capacity(capacity),
        }
    }

    /// Number of slot indices this set can address.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.sparse.len()
    }

    /// Number of ids in the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns true if the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Adds `id`. Adding an id twice is idempotent.
    ///
    /// If an older generation of the same slot is present it is replaced.
    /// Returns false if `id` is null or out of range.
    pub fn add(&mut self, id: PoolId) -> bool {
        if id.is_null() {
            return false;
        }
        let Some(&pos) = self.sparse.get(id.index() as usize) else {
            return false;
        };
        if pos != EMPTY {
            self.dense[pos as usize] = id;
            return true;
        }
        #[allow(clippy::cast_possible_truncation)]
        let pos = self.dense.len() as u32;
        self.sparse[id.index() as usize] = pos;
        self.dense.push(id);
        true
    }

    /// Removes `id`. Removing an id that is not present is a no-op.
    ///
    /// Returns true if the id was present.
    pub fn remove(&mut self, id: PoolId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let slot = id.index() as usize;
        let pos = self.sparse[slot] as usize;
        self.dense.swap_remove(pos);
        if let Some(&moved) = self.dense.get(pos) {
            self.sparse[moved.index() as usize] = self.sparse[slot];
        }
        self.sparse[slot] = EMPTY;
        true
    }

    /// O(1) membership test.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: PoolId) -> bool {
        if id.is_null() {
            return false;
        }
        match self.sparse.get(id.index() as usize) {
            Some(&pos) if pos != EMPTY => self.dense[pos as usize] == id,
            _ => false,
        }
    }

    /// Iterates over the member ids.
    pub fn iter(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.dense.iter().copied()
    }

    /// Member ids as a slice, in iteration order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[PoolId] {
        &self.dense
    }

    /// Removes every id.
    pub fn clear(&mut self) {
        for id in self.dense.drain(..) {
            self.sparse[id.index() as usize] = EMPTY;
        }
    }
}
