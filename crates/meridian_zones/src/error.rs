//! # Zone Error Types
//!
//! Errors for the fallible edges of the zone system. The per-tick sweep
//! itself never fails; it skips what it cannot evaluate.

use std::path::PathBuf;

use thiserror::Error;

use crate::math::Vec2;

/// Errors that can occur in the zone system.
#[derive(Error, Debug)]
pub enum ZonesError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`ZonesConfig`](crate::ZonesConfig).
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Zone rectangle whose minimum exceeds its maximum.
    #[error("inverted zone bounds: min {min:?}, max {max:?}")]
    InvertedBounds {
        /// Requested minimum corner.
        min: Vec2,
        /// Requested maximum corner.
        max: Vec2,
    },

    /// Every zone slot is taken.
    #[error("zone pool exhausted: capacity {capacity}")]
    PoolExhausted {
        /// Pool capacity.
        capacity: usize,
    },
}

/// Result type for zone operations.
pub type ZonesResult<T> = Result<T, ZonesError>;
