//! Resilience configuration types

use rcs_providers::PollOptions;
use rcs_providers::constants::{POLL_DEFAULT_INTERVAL_SECS, POLL_DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Polling behaviour while waiting on asynchronous resources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Delay between status polls in seconds
    pub poll_interval_secs: u64,

    /// Give up waiting after this many seconds
    pub poll_timeout_secs: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: POLL_DEFAULT_INTERVAL_SECS,
            poll_timeout_secs: POLL_DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ResilienceConfig {
    /// Options for `poll_until` and the load balancer waits
    pub fn poll_options(&self) -> PollOptions {
        PollOptions::new(
            Duration::from_secs(self.poll_interval_secs),
            Duration::from_secs(self.poll_timeout_secs),
        )
    }
}
