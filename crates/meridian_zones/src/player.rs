//! # Players
//!
//! The per-tick view of a player ([`Observer`]) and the per-player zone id
//! table that lives from attach to detach ([`PlayerZoneData`]).

use meridian_core::IdTable;

use crate::math::Vec3;
use crate::zone::{PlayerId, Zone, ZoneId};

/// Position and visibility source for one player.
pub trait Observer {
    /// Id of the observed player.
    fn player_id(&self) -> PlayerId;

    /// Current position. Only `x` and `y` count for containment.
    fn position(&self) -> Vec3;

    /// Whether `zone` can transition for this player at all.
    ///
    /// Defaults to the zone's shown flag for the player.
    fn is_zone_visible(&self, id: ZoneId, zone: &Zone) -> bool {
        let _ = id;
        zone.is_shown_for_player(self.player_id())
    }
}

/// Plain player snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Player id.
    pub id: PlayerId,
    /// World position.
    pub position: Vec3,
}

impl PlayerSnapshot {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(id: PlayerId, position: Vec3) -> Self {
        Self { id, position }
    }
}

impl Observer for PlayerSnapshot {
    fn player_id(&self) -> PlayerId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}

/// A player's private numbering of zones.
///
/// External slots map global zones into the player's space; internal slots
/// hold per-player zone numbers. Both come out of the same slot range.
#[derive(Clone, Debug)]
pub struct PlayerZoneData {
    ids: IdTable<ZoneId, u32>,
}

impl PlayerZoneData {
    /// Creates an empty table with `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: IdTable::new(capacity),
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ids.capacity()
    }

    /// Number of slots with either side set.
    #[must_use]
    pub fn used(&self) -> usize {
        self.ids.used()
    }

    /// Maps a global zone to the lowest free slot.
    pub fn reserve_external_id(&mut self, zone: ZoneId) -> Option<usize> {
        self.ids.reserve_external(zone)
    }

    /// Stores a per-player zone number in the lowest free slot.
    pub fn reserve_internal_id(&mut self, zone: u32) -> Option<usize> {
        self.ids.reserve_internal(zone)
    }

    /// Slot holding the global zone.
    #[must_use]
    pub fn external_id(&self, zone: ZoneId) -> Option<usize> {
        self.ids.slot_of_external(zone)
    }

    /// Slot holding the per-player zone number.
    #[must_use]
    pub fn internal_id(&self, zone: u32) -> Option<usize> {
        self.ids.slot_of_internal(zone)
    }

    /// Global zone mapped at `slot`.
    #[must_use]
    pub fn zone_at(&self, slot: usize) -> Option<ZoneId> {
        self.ids.external_at(slot)
    }

    /// Per-player zone number at `slot`.
    #[must_use]
    pub fn internal_at(&self, slot: usize) -> Option<u32> {
        self.ids.internal_at(slot)
    }

    /// Unmaps a global zone. Returns the slot it occupied.
    pub fn release_external_id(&mut self, zone: ZoneId) -> Option<usize> {
        self.ids.release_external(zone)
    }

    /// Clears a per-player zone number. Returns the slot it occupied.
    pub fn release_internal_id(&mut self, zone: u32) -> Option<usize> {
        self.ids.release_internal(zone)
    }

    /// Clears every slot.
    pub fn reset(&mut self) {
        self.ids.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::zone::ZoneBounds;
    use meridian_core::PoolId;

    #[test]
    fn test_default_visibility_uses_shown_flag() {
        let mut zone = Zone::new(ZoneBounds::new(Vec2::ZERO, Vec2::new(1.0, 1.0)).unwrap(), 8);
        let player = PlayerSnapshot::new(2, Vec3::ZERO);
        let id = PoolId::new(0, 0);

        assert!(!player.is_zone_visible(id, &zone));
        zone.show_for_player(2);
        assert!(player.is_zone_visible(id, &zone));
    }

    #[test]
    fn test_zone_data_sides_are_independent() {
        let mut data = PlayerZoneData::new(4);
        let global = PoolId::new(12, 0);

        assert_eq!(data.reserve_external_id(global), Some(0));
        assert_eq!(data.reserve_internal_id(7), Some(1));
        assert_eq!(data.zone_at(0), Some(global));
        assert_eq!(data.internal_id(7), Some(1));

        assert_eq!(data.release_external_id(global), Some(0));
        assert_eq!(data.release_external_id(global), None);
        assert_eq!(data.reserve_external_id(PoolId::new(3, 1)), Some(0));

        data.reset();
        assert_eq!(data.used(), 0);
        assert!((0..data.capacity()).all(|slot| data.zone_at(slot).is_none()));
    }
}
