//! HTTP client configuration

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use rcs_domain::error::{Error, Result};

use crate::constants::{
    HTTP_DEFAULT_CONNECT_TIMEOUT_SECS, HTTP_DEFAULT_TIMEOUT_SECS, RETRY_DEFAULT_INITIAL_BACKOFF_MS,
    RETRY_DEFAULT_MAX_BACKOFF_MS, RETRY_DEFAULT_MAX_RETRIES,
};

/// Retry behaviour for idempotent requests
///
/// Delays grow exponentially from `initial_backoff`, capped at `max_backoff`.
/// A `Retry-After` sent by the service replaces the computed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound of a single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: RETRY_DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(RETRY_DEFAULT_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(RETRY_DEFAULT_MAX_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Never retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// HTTP client configuration
///
/// Controls timeouts, the user agent and retries of every cloud provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Total timeout for requests
    pub timeout: Duration,
    /// Timeout for establishing connections
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Retry policy for idempotent requests
    pub retry: RetryPolicy,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(HTTP_DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(HTTP_DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: format!("rcs/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy::default(),
        }
    }
}

impl HttpClientConfig {
    /// Create configuration with custom timeout only
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Build a reqwest client with these settings
    pub fn build_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| Error::configuration_with_source("failed to build HTTP client", e))
    }
}
