//! # MERIDIAN Core
//!
//! Domain-free building blocks for tick-driven world subsystems:
//! - Bounded pools with lock-guarded deferred release
//! - Sparse checking sets for opt-in per-tick work
//! - Per-consumer identifier virtualization tables
//! - Ordered event dispatch that tolerates re-entrant mutation
//!
//! ## Architecture Rules
//!
//! 1. **Fixed capacity** - every structure is sized once at construction
//! 2. **Single thread of control** - locks guard re-entrancy, not threads
//! 3. **No hidden globals** - callers own every instance they use
//!
//! ## Example
//!
//! ```rust
//! use meridian_core::{CheckingSet, MarkedPool};
//!
//! let mut pool: MarkedPool<u32> = MarkedPool::new(16);
//! let mut checking = CheckingSet::new(pool.capacity());
//!
//! let id = pool.create(7).unwrap();
//! checking.add(id);
//! assert!(checking.contains(id));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod checking;
pub mod dispatch;
pub mod pool;
pub mod virtualization;

pub use checking::CheckingSet;
pub use dispatch::{EventDispatcher, HandlerId};
pub use pool::{MarkedPool, PoolId, PoolLock, Release, ScopedReleaseLock};
pub use virtualization::IdTable;
