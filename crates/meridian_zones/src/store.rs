//! # Zone Store
//!
//! The zone pool, the set of zones opted into per-tick checking, the pool
//! lifecycle dispatcher, and the attached players' zone id tables. Every
//! path that releases a zone goes through here, so the checking set, the
//! id tables and the destroyed event stay in step with the pool whether
//! the release comes from management code or from inside a handler.

use std::rc::Rc;

use meridian_core::{CheckingSet, EventDispatcher, HandlerId, MarkedPool, PoolLock, Release};
use tracing::{debug, warn};

use crate::config::{ZonesConfig, DEFAULT_PLAYER_SLOT_CAPACITY};
use crate::events::ZonePoolEventHandler;
use crate::player::PlayerZoneData;
use crate::zone::{PlayerId, Zone, ZoneBounds, ZoneId};

/// Owns every zone.
#[derive(Debug)]
pub struct ZoneStore {
    pool: MarkedPool<Zone>,
    checking: CheckingSet,
    pool_events: EventDispatcher<dyn ZonePoolEventHandler>,
    /// Indexed by player id; `None` while detached.
    players: Vec<Option<PlayerZoneData>>,
    max_players: u32,
    player_slot_capacity: usize,
}

impl ZoneStore {
    /// Creates an empty store of `capacity` zones whose per-player state
    /// accepts ids below `max_players`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit below `u32::MAX`.
    /// [`ZonesConfig::validate`](crate::ZonesConfig::validate) rejects both.
    #[must_use]
    pub fn new(capacity: usize, max_players: u32) -> Self {
        Self::with_slots(capacity, max_players, DEFAULT_PLAYER_SLOT_CAPACITY)
    }

    /// Creates an empty store sized by `config`.
    ///
    /// # Panics
    ///
    /// Same as [`new`](Self::new); a validated configuration never panics.
    #[must_use]
    pub fn from_config(config: &ZonesConfig) -> Self {
        Self::with_slots(
            config.pool_capacity,
            config.max_players,
            config.player_slot_capacity,
        )
    }

    fn with_slots(capacity: usize, max_players: u32, player_slot_capacity: usize) -> Self {
        Self {
            pool: MarkedPool::new(capacity),
            checking: CheckingSet::new(capacity),
            pool_events: EventDispatcher::new(),
            players: (0..max_players).map(|_| None).collect(),
            max_players,
            player_slot_capacity,
        }
    }

    /// Zone capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Number of live zones, pending releases included.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pool.len()
    }

    /// Returns true if there are no zones.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Valid slot index range, upper bound exclusive.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> (usize, usize) {
        self.pool.bounds()
    }

    /// Creates a zone in the lowest free slot.
    ///
    /// Returns `None` when the pool is full.
    pub fn create(&mut self, bounds: ZoneBounds) -> Option<ZoneId> {
        let Some(id) = self.pool.create(Zone::new(bounds, self.max_players)) else {
            warn!(capacity = self.pool.capacity(), "zone pool exhausted");
            return None;
        };
        debug!(zone = %id, ?bounds, "zone created");

        if let Some(zone) = self.pool.get(id) {
            self.pool_events.dispatch(|h| h.on_zone_created(id, zone));
        }
        Some(id)
    }

    /// Looks up a zone. Zones awaiting deferred release are still visible.
    #[inline]
    #[must_use]
    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.pool.get(id)
    }

    /// Mutable zone lookup.
    #[inline]
    pub fn get_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.pool.get_mut(id)
    }

    /// Resolves a raw slot index to the zone occupying it.
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<ZoneId> {
        self.pool.id_at(index)
    }

    /// Returns true if `id` names a live zone.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ZoneId) -> bool {
        self.pool.contains(id)
    }

    /// Returns true if `id` was released while locked.
    #[must_use]
    pub fn is_pending_release(&self, id: ZoneId) -> bool {
        self.pool.is_pending_release(id)
    }

    /// Releases a zone.
    ///
    /// The zone leaves the checking set, loses every inside flag and is
    /// unmapped from every attached player's id table right away, so no
    /// later sweep can report it and no player keeps a slot for it.
    /// Physical destruction happens now if the zone is unlocked, otherwise
    /// on the final unlock.
    ///
    /// Returns true if the zone was destroyed by this call.
    pub fn release(&mut self, id: ZoneId) -> bool {
        let Some(zone) = self.pool.get_mut(id) else {
            return false;
        };
        zone.clear_inside();
        self.checking.remove(id);
        for data in self.players.iter_mut().flatten() {
            data.release_external_id(id);
        }

        match self.pool.release(id) {
            Release::Destroyed(zone) => {
                debug!(zone = %id, "zone released");
                self.pool_events.dispatch(|h| h.on_zone_destroyed(id, &zone));
                true
            }
            Release::Deferred => {
                debug!(zone = %id, locks = self.pool.lock_count(id), "zone release deferred");
                false
            }
            Release::Missing => false,
        }
    }

    /// Adds a zone to, or removes it from, the per-tick checking set.
    ///
    /// Returns false if the zone does not exist or was already in the
    /// requested state.
    pub fn use_zone_check(&mut self, id: ZoneId, enable: bool) -> bool {
        if !self.pool.contains(id) || self.pool.is_pending_release(id) {
            return false;
        }
        let changed = if enable {
            self.checking.add(id)
        } else {
            self.checking.remove(id)
        };
        if changed {
            debug!(zone = %id, enable, "zone check toggled");
        }
        changed
    }

    /// Returns true if the zone is in the checking set.
    #[inline]
    #[must_use]
    pub fn is_checking(&self, id: ZoneId) -> bool {
        self.checking.contains(id)
    }

    /// Zones in the checking set, in set order.
    pub fn checking_zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.checking.iter()
    }

    pub(crate) fn checking_set(&self) -> &CheckingSet {
        &self.checking
    }

    /// Iterates over every live zone in slot order.
    pub fn entries(&self) -> impl Iterator<Item = (ZoneId, &Zone)> {
        self.pool.iter()
    }

    /// Mutable iteration over every live zone in slot order.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = (ZoneId, &mut Zone)> {
        self.pool.iter_mut()
    }

    /// Releases every zone. Locked zones are deferred as usual.
    pub fn clear(&mut self) {
        let (_, upper) = self.pool.bounds();
        for index in 0..upper {
            if let Some(id) = self.pool.id_at(index) {
                self.release(id);
            }
        }
        self.checking.clear();
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Gives a player a fresh zone id table.
    ///
    /// Returns false if the id is out of range or already attached.
    pub fn attach_player(&mut self, player: PlayerId) -> bool {
        let Some(entry) = self.players.get_mut(player as usize) else {
            warn!(player, max = self.max_players, "player id out of range");
            return false;
        };
        if entry.is_some() {
            warn!(player, "player already attached");
            return false;
        }
        *entry = Some(PlayerZoneData::new(self.player_slot_capacity));
        debug!(player, "player attached");
        true
    }

    /// Forgets a player in every zone and drops its id table.
    ///
    /// Returns false if the player was not attached.
    pub fn detach_player(&mut self, player: PlayerId) -> bool {
        let Some(entry) = self.players.get_mut(player as usize) else {
            return false;
        };
        if entry.take().is_none() {
            return false;
        }
        for (_, zone) in self.entries_mut() {
            zone.remove_for(player);
        }
        debug!(player, "player detached");
        true
    }

    /// Returns true if the player is attached.
    #[must_use]
    pub fn is_player_attached(&self, player: PlayerId) -> bool {
        self.player_data(player).is_some()
    }

    /// Ids of every attached player.
    pub fn attached_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().enumerate().filter_map(|(index, data)| {
            #[allow(clippy::cast_possible_truncation)]
            let player = index as PlayerId;
            data.as_ref().map(|_| player)
        })
    }

    /// An attached player's zone id table.
    #[must_use]
    pub fn player_data(&self, player: PlayerId) -> Option<&PlayerZoneData> {
        self.players.get(player as usize)?.as_ref()
    }

    /// Mutable access to an attached player's zone id table.
    pub fn player_data_mut(&mut self, player: PlayerId) -> Option<&mut PlayerZoneData> {
        self.players.get_mut(player as usize)?.as_mut()
    }

    /// Clears every attached player's id table. Players stay attached.
    pub fn reset_player_data(&mut self) {
        for data in self.players.iter_mut().flatten() {
            data.reset();
        }
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// Registers a pool lifecycle handler.
    pub fn add_pool_handler(&self, handler: Rc<dyn ZonePoolEventHandler>) -> HandlerId {
        self.pool_events.add_handler(handler)
    }

    /// Unregisters a pool lifecycle handler.
    pub fn remove_pool_handler(&self, id: HandlerId) -> bool {
        self.pool_events.remove_handler(id)
    }

    /// The pool lifecycle dispatcher.
    #[must_use]
    pub fn pool_events(&self) -> &EventDispatcher<dyn ZonePoolEventHandler> {
        &self.pool_events
    }
}

impl PoolLock for ZoneStore {
    fn lock(&mut self, id: ZoneId) -> bool {
        self.pool.lock(id)
    }

    fn unlock(&mut self, id: ZoneId) -> bool {
        let Some(zone) = self.pool.unlock_reclaim(id) else {
            return false;
        };
        debug!(zone = %id, "deferred zone release completed");
        self.pool_events.dispatch(|h| h.on_zone_destroyed(id, &zone));
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use meridian_core::ScopedReleaseLock;

    use super::*;
    use crate::math::Vec2;

    fn bounds() -> ZoneBounds {
        ZoneBounds::new(Vec2::ZERO, Vec2::new(10.0, 10.0)).unwrap()
    }

    #[derive(Default)]
    struct Lifecycle {
        created: RefCell<Vec<ZoneId>>,
        destroyed: RefCell<Vec<ZoneId>>,
    }

    impl ZonePoolEventHandler for Lifecycle {
        fn on_zone_created(&self, id: ZoneId, _zone: &Zone) {
            self.created.borrow_mut().push(id);
        }

        fn on_zone_destroyed(&self, id: ZoneId, _zone: &Zone) {
            self.destroyed.borrow_mut().push(id);
        }
    }

    #[test]
    fn test_create_until_full() {
        let mut store = ZoneStore::new(2, 4);
        assert!(store.create(bounds()).is_some());
        let second = store.create(bounds()).unwrap();
        assert!(store.create(bounds()).is_none());

        assert!(store.release(second));
        assert_eq!(store.create(bounds()).unwrap().index(), second.index());
    }

    #[test]
    fn test_release_removes_from_checking() {
        let mut store = ZoneStore::new(4, 4);
        let id = store.create(bounds()).unwrap();
        assert!(store.use_zone_check(id, true));
        assert!(!store.use_zone_check(id, true));
        assert!(store.is_checking(id));

        store.release(id);
        assert!(!store.is_checking(id));
        assert_eq!(store.checking_zones().count(), 0);
    }

    #[test]
    fn test_pool_events_fire_once() {
        let mut store = ZoneStore::new(4, 4);
        let lifecycle = Rc::new(Lifecycle::default());
        store.add_pool_handler(lifecycle.clone());

        let id = store.create(bounds()).unwrap();
        assert_eq!(*lifecycle.created.borrow(), vec![id]);

        {
            let mut lock = ScopedReleaseLock::new(&mut store, id);
            assert!(!lock.release(id));
            assert!(lock.is_pending_release(id));
            assert!(lifecycle.destroyed.borrow().is_empty());
            assert!(!lock.release(id));
        }

        assert_eq!(*lifecycle.destroyed.borrow(), vec![id]);
        assert!(!store.contains(id));
    }

    #[test]
    fn test_pending_release_cannot_rejoin_checking() {
        let mut store = ZoneStore::new(4, 4);
        let id = store.create(bounds()).unwrap();

        store.lock(id);
        store.release(id);
        assert!(!store.use_zone_check(id, true));
        assert!(store.unlock(id));
    }

    #[test]
    fn test_release_clears_inside_flags() {
        let mut store = ZoneStore::new(4, 4);
        let id = store.create(bounds()).unwrap();
        store.get_mut(id).unwrap().set_player_inside(1, true);

        store.lock(id);
        store.release(id);
        assert!(!store.get(id).unwrap().is_player_inside(1));
        store.unlock(id);
    }

    #[test]
    fn test_release_unmaps_player_tables() {
        let mut store = ZoneStore::new(4, 4);
        assert!(store.attach_player(2));
        let id = store.create(bounds()).unwrap();
        assert_eq!(store.player_data_mut(2).unwrap().reserve_external_id(id), Some(0));

        store.lock(id);
        assert!(!store.release(id));
        assert_eq!(store.player_data(2).unwrap().external_id(id), None);
        assert_eq!(store.player_data(2).unwrap().used(), 0);
        assert!(store.unlock(id));
    }

    #[test]
    fn test_attach_detach() {
        let mut store = ZoneStore::new(4, 4);
        assert!(store.attach_player(1));
        assert!(!store.attach_player(1));
        assert!(!store.attach_player(4));
        assert_eq!(store.attached_players().collect::<Vec<_>>(), vec![1]);

        let id = store.create(bounds()).unwrap();
        store.get_mut(id).unwrap().show_for_player(1);
        assert!(store.detach_player(1));
        assert!(!store.detach_player(1));
        assert!(!store.get(id).unwrap().is_shown_for_player(1));
        assert!(store.player_data(1).is_none());
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut store = ZoneStore::new(4, 4);
        let a = store.create(bounds()).unwrap();
        let b = store.create(bounds()).unwrap();
        store.use_zone_check(a, true);
        store.lock(b);

        store.clear();
        assert!(!store.contains(a));
        assert!(store.contains(b));
        assert_eq!(store.checking_zones().count(), 0);

        assert!(store.unlock(b));
        assert!(store.is_empty());
    }
}
