//! Main application configuration

use serde::{Deserialize, Serialize};

pub use super::http::HttpConfig;
pub use super::identity::IdentityConfig;
pub use super::logging::LoggingConfig;
pub use super::object_storage::ObjectStorageConfig;
pub use super::providers::{Backend, ProvidersConfig};
pub use super::resilience::ResilienceConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Identity service and credentials
    pub identity: IdentityConfig,
    /// Region for every service; the user's default region when unset
    pub region: Option<String>,
    /// HTTP client settings
    pub http: HttpConfig,
    /// Polling settings
    pub resilience: ResilienceConfig,
    /// Object storage settings
    pub object_storage: ObjectStorageConfig,
    /// Backend selection
    pub providers: ProvidersConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}
