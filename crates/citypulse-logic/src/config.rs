//! Feed configuration: tick cadence, history depth, fallback schedule.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```
//! use citypulse_logic::config::{validate_config, FeedConfig};
//!
//! let config = FeedConfig::from_json_str(r#"{ "tick_interval_ms": 1000 }"#).unwrap();
//! assert_eq!(config.tick_interval_ms, 1000);
//! assert_eq!(config.history_len, 10);
//! assert!(validate_config(&config).is_empty());
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::feed;
use crate::error::{LoadError, ScheduleError};
use crate::schedule::{self, ParsePolicy};
use crate::traffic::{GeoBounds, SYDNEY_BOUNDS};

/// Settings for a [`DashboardFeed`](crate::feed::DashboardFeed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Milliseconds between ticks.
    pub tick_interval_ms: u64,
    /// Readings kept per chart.
    pub history_len: usize,
    /// Schedule used when a venue supplies none.
    pub default_opening_hours: String,
    pub parse_policy: ParsePolicy,
    /// Area in which traffic stations are considered.
    pub bounds: GeoBounds,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: feed::TICK_INTERVAL_MS,
            history_len: feed::HISTORY_LEN,
            default_opening_hours: feed::DEFAULT_OPENING_HOURS.to_string(),
            parse_policy: ParsePolicy::SkipInvalid,
            bounds: SYDNEY_BOUNDS,
        }
    }
}

impl FeedConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tick interval must be positive")]
    ZeroTickInterval,
    #[error("history length must be positive")]
    ZeroHistoryLen,
    #[error("default opening hours do not parse: {0}")]
    DefaultScheduleInvalid(ScheduleError),
    /// Parses, but to zero rules; the fallback venue would never open.
    #[error("default opening hours contain no rules")]
    DefaultScheduleEmpty,
    #[error("bounds are inverted")]
    InvertedBounds(GeoBounds),
}

/// Validate a feed configuration, returning all errors found.
pub fn validate_config(config: &FeedConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.tick_interval_ms == 0 {
        errors.push(ConfigError::ZeroTickInterval);
    }
    if config.history_len == 0 {
        errors.push(ConfigError::ZeroHistoryLen);
    }

    match schedule::parse(&config.default_opening_hours) {
        Ok(rules) if rules.is_empty() => errors.push(ConfigError::DefaultScheduleEmpty),
        Ok(_) => {}
        Err(e) => errors.push(ConfigError::DefaultScheduleInvalid(e)),
    }

    if !config.bounds.is_well_formed() {
        errors.push(ConfigError::InvertedBounds(config.bounds));
    }

    errors
}
