//! Configuration for the lending core.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

use crate::cart::DEFAULT_CART_CAPACITY;
use crate::types::ReasonCode;

/// Settings the controller reads at construction time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingConfig {
    /// Maximum items per cart (at least 1)
    pub cart_capacity: usize,
    /// Reason used when the caller gives none
    pub default_reason: ReasonCode,
    /// Whether submissions leave an ID deposit unless told otherwise
    pub id_deposit_default: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            cart_capacity: DEFAULT_CART_CAPACITY,
            default_reason: ReasonCode::Normal,
            id_deposit_default: true,
            log_level: "info".to_string(),
        }
    }
}

impl LendingConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `CIRCUITLEND_CART_CAPACITY` | `10` |
    /// | `CIRCUITLEND_DEFAULT_REASON` | `normal` |
    /// | `CIRCUITLEND_ID_DEPOSIT_DEFAULT` | `true` |
    /// | `RUST_LOG` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    ///
    /// Unparseable values fall back to their defaults; a capacity of 0 is
    /// raised to 1.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            cart_capacity: lookup("CIRCUITLEND_CART_CAPACITY")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .map_or(defaults.cart_capacity, |capacity| capacity.max(1)),
            default_reason: lookup("CIRCUITLEND_DEFAULT_REASON")
                .map_or(defaults.default_reason, |s| ReasonCode::parse(&s)),
            id_deposit_default: lookup("CIRCUITLEND_ID_DEPOSIT_DEFAULT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.id_deposit_default),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}
