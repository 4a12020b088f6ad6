//! HTTP client configuration types

use rcs_providers::constants::{
    HTTP_DEFAULT_CONNECT_TIMEOUT_SECS, HTTP_DEFAULT_TIMEOUT_SECS, RETRY_DEFAULT_INITIAL_BACKOFF_MS,
    RETRY_DEFAULT_MAX_BACKOFF_MS, RETRY_DEFAULT_MAX_RETRIES,
};
use rcs_providers::{HttpClientConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP settings shared by every cloud provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Total request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Retries of idempotent requests after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    pub initial_backoff_ms: u64,

    /// Upper bound of a single retry delay in milliseconds
    pub max_backoff_ms: u64,

    /// Overrides the default `rcs/<version>` user agent
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: HTTP_DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: HTTP_DEFAULT_CONNECT_TIMEOUT_SECS,
            max_retries: RETRY_DEFAULT_MAX_RETRIES,
            initial_backoff_ms: RETRY_DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: RETRY_DEFAULT_MAX_BACKOFF_MS,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Client settings understood by the providers
    pub fn client_config(&self) -> HttpClientConfig {
        let defaults = HttpClientConfig::default();
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                initial_backoff: Duration::from_millis(self.initial_backoff_ms),
                max_backoff: Duration::from_millis(self.max_backoff_ms),
            },
        }
    }
}
