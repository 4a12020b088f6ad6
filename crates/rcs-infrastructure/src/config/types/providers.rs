//! Provider backend selection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which implementation backs the service ports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Live cloud REST APIs
    Cloud,
    /// Process-local simulation
    #[default]
    InMemory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloud => f.write_str("cloud"),
            Self::InMemory => f.write_str("in_memory"),
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Backend for every service
    pub backend: Backend,
}
