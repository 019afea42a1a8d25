//! # Pools
//!
//! Bounded entity storage for zone-like objects that are created and
//! destroyed at runtime.
//!
//! ## Design Philosophy
//!
//! All slots are allocated once at startup. During gameplay:
//! - Ids are small, stable slot indices (lowest free slot first)
//! - Destruction of an entry that is referenced by running dispatch is
//!   deferred until the last release lock goes away

mod id;
mod lock;
mod storage;

pub use id::PoolId;
pub use lock::{PoolLock, ScopedReleaseLock};
pub use storage::{MarkedPool, Release};
