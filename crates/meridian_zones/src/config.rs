//! # Zone Configuration
//!
//! Capacities for the zone component, loaded once at startup from TOML.
//!
//! ```toml
//! pool_capacity = 1024
//! player_slot_capacity = 1024
//! max_players = 1000
//! tick_rate = 60
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{ZonesError, ZonesResult};

/// Default zone pool size.
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

/// Default number of per-player zone id slots.
pub const DEFAULT_PLAYER_SLOT_CAPACITY: usize = 1024;

/// Default player id bound.
pub const DEFAULT_MAX_PLAYERS: u32 = 1000;

/// Default simulation tick rate (Hz).
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Zone component configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZonesConfig {
    /// Maximum number of live zones.
    pub pool_capacity: usize,
    /// Size of each attached player's zone id table.
    pub player_slot_capacity: usize,
    /// Player ids must be below this bound to attach.
    pub max_players: u32,
    /// Ticks per second for drivers that run their own loop.
    pub tick_rate: u32,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            player_slot_capacity: DEFAULT_PLAYER_SLOT_CAPACITY,
            max_players: DEFAULT_MAX_PLAYERS,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

impl ZonesConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ZonesError::ConfigParse`] for malformed TOML or unknown keys
    /// and [`ZonesError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> ZonesResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ZonesError::ConfigRead`] if the file cannot be read, plus
    /// everything [`from_toml_str`](Self::from_toml_str) returns.
    pub fn load(path: impl AsRef<Path>) -> ZonesResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ZonesError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ZonesError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> ZonesResult<()> {
        if self.pool_capacity == 0 || self.pool_capacity >= u32::MAX as usize {
            return Err(ZonesError::InvalidConfig(format!(
                "pool_capacity must be in 1..{}, got {}",
                u32::MAX,
                self.pool_capacity
            )));
        }
        if self.player_slot_capacity == 0 {
            return Err(ZonesError::InvalidConfig(
                "player_slot_capacity must be greater than zero".into(),
            ));
        }
        if self.max_players == 0 {
            return Err(ZonesError::InvalidConfig(
                "max_players must be greater than zero".into(),
            ));
        }
        if !(1..=1000).contains(&self.tick_rate) {
            return Err(ZonesError::InvalidConfig(format!(
                "tick_rate must be in 1..=1000, got {}",
                self.tick_rate
            )));
        }
        Ok(())
    }
}
