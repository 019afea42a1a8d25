//! # Zones Component
//!
//! The owning subsystem instance. It holds the zone store (which also keeps
//! one id table per attached player), the membership dispatcher and the
//! tracker, and maps the host's player lifecycle onto them:
//!
//! | host hook               | effect                                       |
//! |-------------------------|----------------------------------------------|
//! | `on_player_connect`     | fresh id table                               |
//! | `on_player_update`      | one membership sweep                         |
//! | `on_player_disconnect`  | purge flags from every zone, drop the table  |

use std::rc::Rc;

use meridian_core::{EventDispatcher, HandlerId, PoolLock};
use tracing::debug;

use crate::config::ZonesConfig;
use crate::error::{ZonesError, ZonesResult};
use crate::events::{ZoneEventHandler, ZonePoolEventHandler};
use crate::player::{Observer, PlayerZoneData};
use crate::store::ZoneStore;
use crate::tracker::ZoneMembershipTracker;
use crate::zone::{PlayerId, Zone, ZoneBounds, ZoneId};

/// Rectangular zones with per-player enter/leave tracking.
#[derive(Debug)]
pub struct ZonesComponent {
    config: ZonesConfig,
    store: ZoneStore,
    events: EventDispatcher<dyn ZoneEventHandler>,
    tracker: ZoneMembershipTracker,
}

impl ZonesComponent {
    /// Component name.
    pub const NAME: &'static str = "Zones";

    /// Builds a component from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ZonesError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn new(config: ZonesConfig) -> ZonesResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ZonesConfig) -> Self {
        Self {
            store: ZoneStore::from_config(&config),
            events: EventDispatcher::new(),
            tracker: ZoneMembershipTracker::with_capacity(config.pool_capacity),
            config,
        }
    }

    /// Crate version.
    #[must_use]
    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ZonesConfig {
        &self.config
    }

    // =========================================================================
    // Zones
    // =========================================================================

    /// Creates a zone. Returns `None` when the pool is full.
    pub fn create(&mut self, bounds: ZoneBounds) -> Option<ZoneId> {
        self.store.create(bounds)
    }

    /// Creates a zone.
    ///
    /// # Errors
    ///
    /// Returns [`ZonesError::PoolExhausted`] when the pool is full.
    pub fn try_create(&mut self, bounds: ZoneBounds) -> ZonesResult<ZoneId> {
        self.store.create(bounds).ok_or(ZonesError::PoolExhausted {
            capacity: self.store.capacity(),
        })
    }

    /// Looks up a zone.
    #[must_use]
    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.store.get(id)
    }

    /// Mutable zone lookup.
    pub fn get_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.store.get_mut(id)
    }

    /// Releases a zone and unmaps it from every player's id table.
    ///
    /// Returns true if the zone was destroyed now, false if it was locked
    /// (destroyed on the final unlock) or unknown.
    pub fn release(&mut self, id: ZoneId) -> bool {
        self.store.release(id)
    }

    /// Pins a zone against destruction.
    pub fn lock(&mut self, id: ZoneId) -> bool {
        self.store.lock(id)
    }

    /// Unpins a zone. Returns true if this completed a deferred release.
    pub fn unlock(&mut self, id: ZoneId) -> bool {
        self.store.unlock(id)
    }

    /// Opts a zone in or out of per-tick checking.
    pub fn use_zone_check(&mut self, id: ZoneId, enable: bool) -> bool {
        self.store.use_zone_check(id, enable)
    }

    /// Whether a zone is checked every tick.
    #[must_use]
    pub fn is_checking(&self, id: ZoneId) -> bool {
        self.store.is_checking(id)
    }

    /// Zones that are checked every tick.
    pub fn checking_zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.store.checking_zones()
    }

    /// Valid slot index range, upper bound exclusive.
    #[must_use]
    pub fn bounds(&self) -> (usize, usize) {
        self.store.bounds()
    }

    /// Every live zone in slot order.
    pub fn entries(&self) -> impl Iterator<Item = (ZoneId, &Zone)> {
        self.store.entries()
    }

    /// Number of live zones.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if there are no zones.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The zone store.
    #[must_use]
    pub const fn store(&self) -> &ZoneStore {
        &self.store
    }

    /// Mutable zone store access.
    pub fn store_mut(&mut self) -> &mut ZoneStore {
        &mut self.store
    }

    /// Shows a zone to a player. Returns false if the zone is unknown or
    /// already shown.
    pub fn show_for_player(&mut self, id: ZoneId, player: PlayerId) -> bool {
        self.store
            .get_mut(id)
            .is_some_and(|zone| zone.show_for_player(player))
    }

    /// Hides a zone from a player. No leave event results.
    pub fn hide_for_player(&mut self, id: ZoneId, player: PlayerId) -> bool {
        self.store
            .get_mut(id)
            .is_some_and(|zone| zone.hide_for_player(player))
    }

    /// Releases every zone and clears every attached player's id table.
    pub fn reset(&mut self) {
        self.store.clear();
        self.store.reset_player_data();
        debug!("zones reset");
    }

    // =========================================================================
    // Player lifecycle
    // =========================================================================

    /// Attaches a player.
    ///
    /// Returns false if the id is out of range or already attached.
    pub fn on_player_connect(&mut self, player: PlayerId) -> bool {
        self.store.attach_player(player)
    }

    /// Detaches a player: forgets it in every zone and drops its table.
    ///
    /// Returns false if the player was not attached.
    pub fn on_player_disconnect(&mut self, player: PlayerId) -> bool {
        self.store.detach_player(player)
    }

    /// Returns true if the player is attached.
    #[must_use]
    pub fn is_player_attached(&self, player: PlayerId) -> bool {
        self.store.is_player_attached(player)
    }

    /// Ids of every attached player.
    pub fn attached_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.store.attached_players()
    }

    /// Runs one membership sweep for an attached player.
    ///
    /// Detached players are ignored. Returns the number of transitions.
    pub fn on_player_update<O: Observer + ?Sized>(&mut self, observer: &O) -> usize {
        if !self.is_player_attached(observer.player_id()) {
            return 0;
        }
        self.tracker.update(&mut self.store, &self.events, observer)
    }

    /// An attached player's zone id table.
    #[must_use]
    pub fn player_data(&self, player: PlayerId) -> Option<&PlayerZoneData> {
        self.store.player_data(player)
    }

    /// Mutable access to an attached player's zone id table.
    pub fn player_data_mut(&mut self, player: PlayerId) -> Option<&mut PlayerZoneData> {
        self.store.player_data_mut(player)
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// Registers a membership handler.
    pub fn add_event_handler(&self, handler: Rc<dyn ZoneEventHandler>) -> HandlerId {
        self.events.add_handler(handler)
    }

    /// Unregisters a membership handler.
    pub fn remove_event_handler(&self, id: HandlerId) -> bool {
        self.events.remove_handler(id)
    }

    /// The membership dispatcher.
    #[must_use]
    pub const fn events(&self) -> &EventDispatcher<dyn ZoneEventHandler> {
        &self.events
    }

    /// Registers a zone lifecycle handler.
    pub fn add_pool_handler(&self, handler: Rc<dyn ZonePoolEventHandler>) -> HandlerId {
        self.store.add_pool_handler(handler)
    }

    /// Unregisters a zone lifecycle handler.
    pub fn remove_pool_handler(&self, id: HandlerId) -> bool {
        self.store.remove_pool_handler(id)
    }

    /// The zone lifecycle dispatcher.
    #[must_use]
    pub fn pool_events(&self) -> &EventDispatcher<dyn ZonePoolEventHandler> {
        self.store.pool_events()
    }
}

impl Default for ZonesComponent {
    fn default() -> Self {
        Self::build(ZonesConfig::default())
    }
}
