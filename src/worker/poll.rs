//! Polling configuration.
//!
//! # Polling Strategy
//!
//! - **Poll interval**: 5 minutes by default (configurable via `DM_RESHARE_POLL_INTERVAL_MINS`)
//! - **Throttle cooldown**: 15 minutes by default (configurable via
//!   `DM_RESHARE_THROTTLE_COOLDOWN_MINS`). When the inbox feed reports a rate
//!   limit, the cycle sleeps this long and reissues the same page request.
//! - **Page size**: 50 events per inbox request

use std::time::Duration;

use tracing::warn;

use crate::extract::DEFAULT_DOMAIN;

/// Default poll interval (5 minutes).
const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Default sleep after a throttled feed request (15 minutes).
const DEFAULT_THROTTLE_COOLDOWN_SECS: u64 = 900;

/// Default number of events requested per inbox page.
const DEFAULT_PAGE_SIZE: u32 = 50;

/// Configuration for the poll loop and a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Interval between poll cycles.
    ///
    /// Default: 5 minutes. Configure via `DM_RESHARE_POLL_INTERVAL_MINS`.
    pub poll_interval: Duration,

    /// How long to wait before retrying a throttled feed request.
    ///
    /// Default: 15 minutes. Configure via `DM_RESHARE_THROTTLE_COOLDOWN_MINS`.
    pub throttle_cooldown: Duration,

    /// Events requested per inbox page.
    pub page_size: u32,

    /// Domain that tweet links must point at.
    pub link_domain: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    /// Creates a new `PollConfig` with default values.
    pub fn new() -> Self {
        PollConfig {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            throttle_cooldown: Duration::from_secs(DEFAULT_THROTTLE_COOLDOWN_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            link_domain: DEFAULT_DOMAIN.to_string(),
        }
    }

    /// Creates a `PollConfig` from environment variables.
    ///
    /// Unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a `PollConfig` from an arbitrary variable lookup.
    ///
    /// Zero, unparseable, and out-of-range minute counts fall back to the
    /// default: a zero period cannot drive a timer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let minutes = |key: &str, default_secs: u64| {
            let secs = lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|&mins| mins > 0)
                .and_then(|mins| mins.checked_mul(60));
            match secs {
                Some(secs) => Duration::from_secs(secs),
                None => {
                    if lookup(key).is_some() {
                        warn!(key, "Invalid minute count, using default");
                    }
                    Duration::from_secs(default_secs)
                }
            }
        };

        PollConfig {
            poll_interval: minutes("DM_RESHARE_POLL_INTERVAL_MINS", DEFAULT_POLL_INTERVAL_SECS),
            throttle_cooldown: minutes(
                "DM_RESHARE_THROTTLE_COOLDOWN_MINS",
                DEFAULT_THROTTLE_COOLDOWN_SECS,
            ),
            ..Self::new()
        }
    }

    /// Sets the throttle cooldown.
    pub fn with_throttle_cooldown(mut self, cooldown: Duration) -> Self {
        self.throttle_cooldown = cooldown;
        self
    }
}
