//! # Release Locks
//!
//! RAII guard that pins a pool entry while it is referenced by in-flight
//! event dispatch.

use std::ops::{Deref, DerefMut};

use super::id::PoolId;

/// Anything that can pin and unpin entries by [`PoolId`].
///
/// Implemented by [`MarkedPool`](super::MarkedPool) and by higher-level
/// stores that wrap one and need to react when an unlock finishes a
/// deferred release.
pub trait PoolLock {
    /// Increments the lock counter of `id`. Returns false if `id` is not live.
    fn lock(&mut self, id: PoolId) -> bool;

    /// Decrements the lock counter of `id`. Returns true if the entry was
    /// destroyed as a result of this call.
    fn unlock(&mut self, id: PoolId) -> bool;
}

/// Holds one release lock on a pool entry for as long as it lives.
///
/// The guard dereferences to the locked pool, so code running under the
/// lock (typically event handlers) can keep using the pool, including
/// releasing the very entry that is locked. Such a release is deferred and
/// completes when the guard is dropped or [`finish`](Self::finish)ed.
///
/// # Example
///
/// ```rust
/// use meridian_core::pool::{MarkedPool, ScopedReleaseLock};
///
/// let mut pool: MarkedPool<u32> = MarkedPool::new(2);
/// let id = pool.create(1).unwrap();
///
/// let mut lock = ScopedReleaseLock::new(&mut pool, id);
/// let _ = lock.release(id);
/// assert!(lock.get(id).is_some());
/// assert!(lock.finish());
///
/// assert!(pool.get(id).is_none());
/// ```
pub struct ScopedReleaseLock<'a, P: PoolLock + ?Sized> {
    pool: &'a mut P,
    id: PoolId,
    held: bool,
}

impl<'a, P: PoolLock + ?Sized> ScopedReleaseLock<'a, P> {
    /// Locks `id` in `pool`.
    ///
    /// Locking an id that is not live yields a guard that holds nothing
    /// and unlocks nothing.
    pub fn new(pool: &'a mut P, id: PoolId) -> Self {
        let held = pool.lock(id);
        Self { pool, id, held }
    }

    /// The locked id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Returns true if the guard actually holds a lock.
    #[inline]
    #[must_use]
    pub const fn is_held(&self) -> bool {
        self.held
    }

    /// Drops the lock now and reports whether that destroyed the entry.
    pub fn finish(mut self) -> bool {
        self.unlock_once()
    }

    fn unlock_once(&mut self) -> bool {
        if !self.held {
            return false;
        }
        self.held = false;
        self.pool.unlock(self.id)
    }
}

impl<P: PoolLock + ?Sized> Deref for ScopedReleaseLock<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.pool
    }
}

impl<P: PoolLock + ?Sized> DerefMut for ScopedReleaseLock<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.pool
    }
}

impl<P: PoolLock + ?Sized> Drop for ScopedReleaseLock<'_, P> {
    fn drop(&mut self) {
        let _ = self.unlock_once();
    }
}
