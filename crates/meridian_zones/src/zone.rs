//! # Zones
//!
//! A zone is an axis-aligned rectangle on the horizontal plane plus two
//! per-player flags: whether the zone is shown to the player, and whether
//! the player is currently recorded as inside it.

use meridian_core::PoolId;

use crate::error::{ZonesError, ZonesResult};
use crate::math::Vec2;

/// Identifier of a zone in the zone pool.
pub type ZoneId = PoolId;

/// Identifier of a connected player.
pub type PlayerId = u32;

/// Inclusive rectangle `[min.x, max.x] x [min.y, max.y]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneBounds {
    min: Vec2,
    max: Vec2,
}

impl ZoneBounds {
    /// Creates bounds from a minimum and maximum corner.
    ///
    /// # Errors
    ///
    /// Returns [`ZonesError::InvertedBounds`] if `min` exceeds `max` on
    /// either axis (or either corner is NaN).
    pub fn new(min: Vec2, max: Vec2) -> ZonesResult<Self> {
        if min.x <= max.x && min.y <= max.y {
            Ok(Self { min, max })
        } else {
            Err(ZonesError::InvertedBounds { min, max })
        }
    }

    /// Creates bounds spanning two arbitrary opposite corners.
    #[must_use]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Minimum corner.
    #[inline]
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Maximum corner.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Inclusive containment test.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Fixed-size set of player ids below a bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSet {
    words: Box<[u64]>,
    bound: u32,
}

impl PlayerSet {
    /// Creates an empty set accepting ids in `0..bound`.
    #[must_use]
    pub fn new(bound: u32) -> Self {
        let words = (bound as usize).div_ceil(64);
        Self {
            words: vec![0; words].into_boxed_slice(),
            bound,
        }
    }

    /// Inserts `player`. Returns false if it was already present or is out
    /// of range.
    pub fn insert(&mut self, player: PlayerId) -> bool {
        if player >= self.bound {
            return false;
        }
        let (word, bit) = Self::locate(player);
        let was_set = self.words[word] & bit != 0;
        self.words[word] |= bit;
        !was_set
    }

    /// Removes `player`. Returns true if it was present.
    pub fn remove(&mut self, player: PlayerId) -> bool {
        if player >= self.bound {
            return false;
        }
        let (word, bit) = Self::locate(player);
        let was_set = self.words[word] & bit != 0;
        self.words[word] &= !bit;
        was_set
    }

    /// Membership test.
    #[inline]
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        if player >= self.bound {
            return false;
        }
        let (word, bit) = Self::locate(player);
        self.words[word] & bit != 0
    }

    /// Number of players in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Iterates over the players in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            #[allow(clippy::cast_possible_truncation)]
            let base = (index * 64) as u32;
            (0..64u32)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| base + bit)
        })
    }

    /// Removes every player.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    const fn locate(player: PlayerId) -> (usize, u64) {
        ((player / 64) as usize, 1 << (player % 64))
    }
}

/// A rectangular zone.
#[derive(Clone, Debug)]
pub struct Zone {
    bounds: ZoneBounds,
    /// Players the zone is shown to.
    shown: PlayerSet,
    /// Players recorded as inside. Absence means outside.
    inside: PlayerSet,
}

impl Zone {
    /// Creates a zone visible to nobody, with nobody inside.
    #[must_use]
    pub fn new(bounds: ZoneBounds, max_players: u32) -> Self {
        Self {
            bounds,
            shown: PlayerSet::new(max_players),
            inside: PlayerSet::new(max_players),
        }
    }

    /// The zone rectangle.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> &ZoneBounds {
        &self.bounds
    }

    /// Shows the zone to `player`. Returns false if it already was.
    pub fn show_for_player(&mut self, player: PlayerId) -> bool {
        self.shown.insert(player)
    }

    /// Hides the zone from `player`. Returns true if it was shown.
    ///
    /// Hiding does not change the inside flag: the player simply stops
    /// transitioning until the zone is shown again.
    pub fn hide_for_player(&mut self, player: PlayerId) -> bool {
        self.shown.remove(player)
    }

    /// Whether the zone is shown to `player`.
    #[inline]
    #[must_use]
    pub fn is_shown_for_player(&self, player: PlayerId) -> bool {
        self.shown.contains(player)
    }

    /// Players the zone is shown to.
    #[must_use]
    pub fn shown_players(&self) -> &PlayerSet {
        &self.shown
    }

    /// Whether `player` is recorded as inside.
    #[inline]
    #[must_use]
    pub fn is_player_inside(&self, player: PlayerId) -> bool {
        self.inside.contains(player)
    }

    /// Players recorded as inside.
    #[must_use]
    pub fn players_inside(&self) -> &PlayerSet {
        &self.inside
    }

    /// Forgets everything about `player`.
    pub fn remove_for(&mut self, player: PlayerId) {
        self.shown.remove(player);
        self.inside.remove(player);
    }

    pub(crate) fn set_player_inside(&mut self, player: PlayerId, inside: bool) {
        if inside {
            self.inside.insert(player);
        } else {
            self.inside.remove(player);
        }
    }

    pub(crate) fn clear_inside(&mut self) {
        self.inside.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> ZoneBounds {
        ZoneBounds::new(Vec2::ZERO, Vec2::new(size, size)).unwrap()
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bounds = square(10.0);
        assert!(bounds.contains(Vec2::new(0.0, 0.0)));
        assert!(bounds.contains(Vec2::new(10.0, 10.0)));
        assert!(bounds.contains(Vec2::new(10.0, 0.0)));
        assert!(!bounds.contains(Vec2::new(10.01, 5.0)));
        assert!(!bounds.contains(Vec2::new(5.0, -0.01)));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = ZoneBounds::new(Vec2::new(5.0, 0.0), Vec2::new(1.0, 3.0)).unwrap_err();
        assert!(matches!(err, ZonesError::InvertedBounds { .. }));
        assert!(ZoneBounds::new(Vec2::new(f32::NAN, 0.0), Vec2::ZERO).is_err());
    }

    #[test]
    fn test_from_corners_normalizes() {
        let bounds = ZoneBounds::from_corners(Vec2::new(5.0, -1.0), Vec2::new(1.0, 3.0));
        assert_eq!(bounds.min(), Vec2::new(1.0, -1.0));
        assert_eq!(bounds.max(), Vec2::new(5.0, 3.0));
    }

    #[test]
    fn test_player_set() {
        let mut set = PlayerSet::new(130);
        assert!(set.insert(0));
        assert!(set.insert(64));
        assert!(set.insert(129));
        assert!(!set.insert(129));
        assert!(!set.insert(130));

        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 64, 129]);
        assert_eq!(set.len(), 3);
        assert!(set.remove(64));
        assert!(!set.remove(64));
        assert!(!set.contains(64));

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_for_clears_both_flags() {
        let mut zone = Zone::new(square(1.0), 8);
        zone.show_for_player(3);
        zone.set_player_inside(3, true);

        zone.remove_for(3);
        assert!(!zone.is_shown_for_player(3));
        assert!(!zone.is_player_inside(3));
    }

    #[test]
    fn test_shown_players_tracks_visibility() {
        let mut zone = Zone::new(square(1.0), 8);
        zone.show_for_player(5);
        zone.show_for_player(1);
        assert!(!zone.show_for_player(5));
        assert_eq!(zone.shown_players().iter().collect::<Vec<_>>(), vec![1, 5]);

        zone.hide_for_player(1);
        assert_eq!(zone.shown_players().len(), 1);
    }

    #[test]
    fn test_hide_keeps_inside_flag() {
        let mut zone = Zone::new(square(1.0), 8);
        zone.show_for_player(2);
        zone.set_player_inside(2, true);

        assert!(zone.hide_for_player(2));
        assert!(zone.is_player_inside(2));
    }
}
