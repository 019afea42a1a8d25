//! # MERIDIAN Zones
//!
//! Axis-aligned rectangular zones on the horizontal plane, with
//! edge-triggered enter/leave events per player.
//!
//! ## Architecture Rules
//!
//! 1. **Opt-in checking** - only zones in the checking set cost anything per tick
//! 2. **Edge-triggered** - an event fires on a transition, never while a state holds
//! 3. **Visibility gates** - a zone hidden from a player never transitions for it
//! 4. **Locked while dispatched** - handlers may release the zone they are told about
//!
//! ## Example
//!
//! ```rust
//! use meridian_zones::{PlayerSnapshot, Vec2, Vec3, ZoneBounds, ZonesComponent, ZonesConfig};
//!
//! let mut zones = ZonesComponent::new(ZonesConfig::default()).unwrap();
//! zones.on_player_connect(0);
//!
//! let id = zones
//!     .create(ZoneBounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0)).unwrap())
//!     .unwrap();
//! zones.show_for_player(id, 0);
//! zones.use_zone_check(id, true);
//!
//! let player = PlayerSnapshot::new(0, Vec3::new(50.0, 50.0, 10.0));
//! assert_eq!(zones.on_player_update(&player), 1);
//! assert_eq!(zones.on_player_update(&player), 0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod component;
pub mod config;
pub mod error;
pub mod events;
pub mod math;
pub mod player;
pub mod store;
pub mod tracker;
pub mod zone;

pub use meridian_core::{HandlerId, PoolId};

pub use component::ZonesComponent;
pub use config::ZonesConfig;
pub use error::{ZonesError, ZonesResult};
pub use events::{ZoneContext, ZoneEvent, ZoneEventChannel, ZoneEventHandler, ZonePoolEventHandler};
pub use math::{Vec2, Vec3};
pub use player::{Observer, PlayerSnapshot, PlayerZoneData};
pub use store::ZoneStore;
pub use tracker::ZoneMembershipTracker;
pub use zone::{PlayerId, PlayerSet, Zone, ZoneBounds, ZoneId};
