//! # Membership Tracker
//!
//! Per-player, per-tick sweep over the checking set. For every zone shown
//! to the player it compares the geometric containment test with the
//! recorded inside flag and dispatches an event on change only.
//!
//! ```text
//!            inside && visible
//!   Outside ------------------> Inside
//!      ^                          |
//!      +--------------------------+
//!           !inside && visible
//! ```
//!
//! The sweep walks a snapshot of the checking set taken at its start, so
//! handlers that toggle checking only affect the next sweep. Zones that a
//! handler releases are skipped for the rest of the sweep.

use meridian_core::{EventDispatcher, ScopedReleaseLock};
use tracing::trace;

use crate::events::{ZoneContext, ZoneEventHandler};
use crate::player::Observer;
use crate::store::ZoneStore;
use crate::zone::ZoneId;

/// Runs membership sweeps. Holds only scratch space.
#[derive(Debug, Default)]
pub struct ZoneMembershipTracker {
    snapshot: Vec<ZoneId>,
}

impl ZoneMembershipTracker {
    /// Creates a tracker whose scratch space fits `capacity` zones.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshot: Vec::with_capacity(capacity),
        }
    }

    /// Sweeps every checked zone for one player.
    ///
    /// Returns the number of transitions dispatched.
    pub fn update<O: Observer + ?Sized>(
        &mut self,
        store: &mut ZoneStore,
        events: &EventDispatcher<dyn ZoneEventHandler>,
        observer: &O,
    ) -> usize {
        let player = observer.player_id();
        let position = observer.position().xy();

        self.snapshot.clear();
        self.snapshot.extend_from_slice(store.checking_set().as_slice());

        let mut transitions = 0;
        for &id in &self.snapshot {
            let Some(zone) = store.get(id) else {
                continue;
            };
            if store.is_pending_release(id) || !observer.is_zone_visible(id, zone) {
                continue;
            }

            let inside = zone.bounds().contains(position);
            if inside == zone.is_player_inside(player) {
                continue;
            }

            let mut lock = ScopedReleaseLock::new(&mut *store, id);
            if let Some(zone) = lock.get_mut(id) {
                zone.set_player_inside(player, inside);
            }
            trace!(player, zone = %id, inside, "zone membership changed");

            let mut ctx = ZoneContext {
                store: &mut *lock,
                events,
            };
            if inside {
                events.dispatch(|h| h.on_player_enter_zone(&mut ctx, player, id));
            } else {
                events.dispatch(|h| h.on_player_leave_zone(&mut ctx, player, id));
            }
            lock.finish();
            transitions += 1;
        }
        transitions
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::math::{Vec2, Vec3};
    use crate::player::PlayerSnapshot;
    use crate::zone::{PlayerId, ZoneBounds};

    #[derive(Default)]
    struct Recorder {
        log: RefCell<Vec<(&'static str, PlayerId, ZoneId)>>,
        release_on_leave: bool,
    }

    impl ZoneEventHandler for Recorder {
        fn on_player_enter_zone(&self, _ctx: &mut ZoneContext<'_>, player: PlayerId, zone: ZoneId) {
            self.log.borrow_mut().push(("enter", player, zone));
        }

        fn on_player_leave_zone(&self, ctx: &mut ZoneContext<'_>, player: PlayerId, zone: ZoneId) {
            self.log.borrow_mut().push(("leave", player, zone));
            if self.release_on_leave {
                assert!(!ctx.store.release(zone));
                assert!(ctx.store.get(zone).is_some());
            }
        }
    }

    fn setup() -> (ZoneStore, ZoneId) {
        let mut store = ZoneStore::new(8, 8);
        let id = store
            .create(ZoneBounds::new(Vec2::ZERO, Vec2::new(10.0, 10.0)).unwrap())
            .unwrap();
        store.get_mut(id).unwrap().show_for_player(1);
        store.use_zone_check(id, true);
        (store, id)
    }

    fn at(x: f32, y: f32) -> PlayerSnapshot {
        PlayerSnapshot::new(1, Vec3::new(x, y, 500.0))
    }

    #[test]
    fn test_enter_fires_once() {
        let (mut store, id) = setup();
        let events: EventDispatcher<dyn ZoneEventHandler> = EventDispatcher::new();
        let recorder = Rc::new(Recorder::default());
        events.add_handler(recorder.clone());
        let mut tracker = ZoneMembershipTracker::default();

        for _ in 0..5 {
            tracker.update(&mut store, &events, &at(5.0, 5.0));
        }
        assert_eq!(tracker.update(&mut store, &events, &at(20.0, 5.0)), 1);

        assert_eq!(
            *recorder.log.borrow(),
            vec![("enter", 1, id), ("leave", 1, id)]
        );
    }

    #[test]
    fn test_hidden_zone_never_transitions() {
        let (mut store, id) = setup();
        store.get_mut(id).unwrap().hide_for_player(1);
        let events: EventDispatcher<dyn ZoneEventHandler> = EventDispatcher::new();
        let mut tracker = ZoneMembershipTracker::default();

        assert_eq!(tracker.update(&mut store, &events, &at(5.0, 5.0)), 0);
        assert!(!store.get(id).unwrap().is_player_inside(1));
    }

    #[test]
    fn test_release_from_leave_handler_is_deferred() {
        let (mut store, id) = setup();
        let events: EventDispatcher<dyn ZoneEventHandler> = EventDispatcher::new();
        let recorder = Rc::new(Recorder {
            release_on_leave: true,
            ..Recorder::default()
        });
        events.add_handler(recorder.clone());
        let mut tracker = ZoneMembershipTracker::with_capacity(8);

        tracker.update(&mut store, &events, &at(5.0, 5.0));
        tracker.update(&mut store, &events, &at(-1.0, 5.0));

        assert!(!store.contains(id));
        assert_eq!(store.checking_zones().count(), 0);
        assert_eq!(recorder.log.borrow().len(), 2);
    }

    #[test]
    fn test_height_is_ignored() {
        let (mut store, id) = setup();
        let events: EventDispatcher<dyn ZoneEventHandler> = EventDispatcher::new();
        let mut tracker = ZoneMembershipTracker::default();

        let high = PlayerSnapshot::new(1, Vec3::new(10.0, 0.0, -9000.0));
        assert_eq!(tracker.update(&mut store, &events, &high), 1);
        assert!(store.get(id).unwrap().is_player_inside(1));
    }
}
