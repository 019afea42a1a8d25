//! # Pool Identifiers
//!
//! Pool ids are lightweight identifiers consisting of:
//! - A slot index into the pool (the stable small integer callers see)
//! - A generation counter, bumped every time the slot is destroyed

use std::fmt;

/// Identifier of an entry in a [`MarkedPool`](super::MarkedPool).
///
/// The ID is split into two parts:
/// - Lower 32 bits: slot index
/// - Upper 32 bits: generation of the slot when the entry was created
///
/// A stale id (captured before its slot was destroyed and reused) keeps the
/// old generation and is therefore rejected by every pool operation instead
/// of silently aliasing the newer occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PoolId(u64);

impl PoolId {
    /// Null/invalid pool ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Creates a new pool ID from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the slot index portion of the ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Checks if this ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}
