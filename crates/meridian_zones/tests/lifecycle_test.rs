//! # Lifecycle Tests
//!
//! Configuration loading, zone lifecycle events, component reset and
//! event forwarding.
//!
//! Run with: cargo test --test lifecycle_test

use std::cell::RefCell;
use std::rc::Rc;

use meridian_zones::{
    PlayerSnapshot, Vec2, Vec3, Zone, ZoneBounds, ZoneEvent, ZoneEventChannel, ZoneId,
    ZonePoolEventHandler, ZonesComponent, ZonesConfig, ZonesError,
};

#[derive(Default)]
struct Lifecycle {
    created: RefCell<Vec<(ZoneId, Vec2)>>,
    destroyed: RefCell<Vec<ZoneId>>,
}

impl ZonePoolEventHandler for Lifecycle {
    fn on_zone_created(&self, id: ZoneId, zone: &Zone) {
        self.created.borrow_mut().push((id, zone.bounds().min()));
    }

    fn on_zone_destroyed(&self, id: ZoneId, _zone: &Zone) {
        self.destroyed.borrow_mut().push(id);
    }
}

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> ZoneBounds {
    ZoneBounds::new(Vec2::new(x0, y0), Vec2::new(x1, y1)).unwrap()
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_load_config_file() {
    let path = std::env::temp_dir().join(format!("meridian_zones_{}.toml", std::process::id()));
    std::fs::write(&path, "pool_capacity = 4\nmax_players = 2\n").unwrap();

    let config = ZonesConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.pool_capacity, 4);
    assert_eq!(config.max_players, 2);

    let mut zones = ZonesComponent::new(config).unwrap();
    assert!(zones.on_player_connect(1));
    assert!(!zones.on_player_connect(2));
    for _ in 0..4 {
        zones.try_create(rect(0.0, 0.0, 1.0, 1.0)).unwrap();
    }
    assert!(matches!(
        zones.try_create(rect(0.0, 0.0, 1.0, 1.0)),
        Err(ZonesError::PoolExhausted { capacity: 4 })
    ));
}

#[test]
fn test_bad_config_values() {
    assert!(matches!(
        ZonesConfig::from_toml_str("player_slot_capacity = 0"),
        Err(ZonesError::InvalidConfig(_))
    ));
    assert!(matches!(
        ZonesConfig::from_toml_str("pool_capacity = \"many\""),
        Err(ZonesError::ConfigParse(_))
    ));
}

#[test]
fn test_inverted_bounds() {
    let err = ZoneBounds::new(Vec2::new(1.0, 1.0), Vec2::new(0.0, 2.0)).unwrap_err();
    assert!(matches!(err, ZonesError::InvertedBounds { .. }));
    assert!(err.to_string().contains("inverted"));
}

// ============================================================================
// ZONE LIFECYCLE
// ============================================================================

#[test]
fn test_created_and_destroyed_events() {
    let mut zones = ZonesComponent::default();
    let lifecycle = Rc::new(Lifecycle::default());
    let handler = zones.add_pool_handler(lifecycle.clone());

    let a = zones.create(rect(1.0, 2.0, 3.0, 4.0)).unwrap();
    let b = zones.create(rect(5.0, 6.0, 7.0, 8.0)).unwrap();
    assert_eq!(
        *lifecycle.created.borrow(),
        vec![(a, Vec2::new(1.0, 2.0)), (b, Vec2::new(5.0, 6.0))]
    );

    zones.lock(b);
    zones.release(a);
    zones.release(b);
    zones.release(b);
    assert_eq!(*lifecycle.destroyed.borrow(), vec![a]);

    zones.unlock(b);
    assert_eq!(*lifecycle.destroyed.borrow(), vec![a, b]);

    assert!(zones.remove_pool_handler(handler));
    zones.create(rect(0.0, 0.0, 1.0, 1.0));
    assert_eq!(lifecycle.created.borrow().len(), 2);
}

#[test]
fn test_reset_respects_locks() {
    let mut zones = ZonesComponent::default();
    let lifecycle = Rc::new(Lifecycle::default());
    zones.add_pool_handler(lifecycle.clone());
    zones.on_player_connect(0);

    let a = zones.create(rect(0.0, 0.0, 1.0, 1.0)).unwrap();
    let b = zones.create(rect(0.0, 0.0, 1.0, 1.0)).unwrap();
    zones.use_zone_check(a, true);
    zones.player_data_mut(0).unwrap().reserve_external_id(a);
    zones.lock(b);

    zones.reset();
    assert_eq!(*lifecycle.destroyed.borrow(), vec![a]);
    assert_eq!(zones.len(), 1);
    assert_eq!(zones.checking_zones().count(), 0);
    assert_eq!(zones.player_data(0).unwrap().used(), 0);

    assert!(zones.unlock(b));
    assert!(zones.is_empty());
}

#[test]
fn test_release_unmaps_zone_from_every_player() {
    let mut zones = ZonesComponent::default();
    let zone = zones.create(rect(0.0, 0.0, 1.0, 1.0)).unwrap();
    for player in [0, 5] {
        zones.on_player_connect(player);
        zones.player_data_mut(player).unwrap().reserve_external_id(zone);
    }

    zones.release(zone);
    for player in [0, 5] {
        assert_eq!(zones.player_data(player).unwrap().external_id(zone), None);
    }
}

// ============================================================================
// FORWARDING
// ============================================================================

#[test]
fn test_events_forwarded_to_channel() {
    let mut zones = ZonesComponent::default();
    zones.on_player_connect(3);
    let zone = zones.create(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
    zones.show_for_player(zone, 3);
    zones.use_zone_check(zone, true);

    let (channel, receiver) = ZoneEventChannel::bounded(16);
    zones.add_event_handler(Rc::new(channel));

    for x in [5.0, 6.0, 20.0, 5.0] {
        zones.on_player_update(&PlayerSnapshot::new(3, Vec3::new(x, 5.0, 0.0)));
    }

    let events: Vec<ZoneEvent> = receiver.try_iter().collect();
    assert_eq!(
        events,
        vec![
            ZoneEvent::Entered { player: 3, zone },
            ZoneEvent::Left { player: 3, zone },
            ZoneEvent::Entered { player: 3, zone },
        ]
    );
}

#[test]
fn test_component_identity() {
    assert_eq!(ZonesComponent::NAME, "Zones");
    assert_eq!(ZonesComponent::version(), env!("CARGO_PKG_VERSION"));
}
