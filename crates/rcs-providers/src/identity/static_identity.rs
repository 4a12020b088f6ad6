//! Static identity provider
//!
//! Serves a pre-issued token and a fixed endpoint per service type. Useful
//! when tokens are minted outside the process, and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use rcs_domain::error::{Error, Result};
use rcs_domain::ports::IdentityProvider;
use rcs_domain::value_objects::AuthToken;

/// Identity provider with a fixed token and endpoint map
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    token: String,
    endpoints: HashMap<String, String>,
}

impl StaticIdentityProvider {
    /// Create a provider serving `token`
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
            endpoints: HashMap::new(),
        }
    }

    /// Register the base URL of a service type
    #[must_use]
    pub fn with_endpoint<T: Into<String>, U: Into<String>>(mut self, service_type: T, url: U) -> Self {
        let url: String = url.into();
        self.endpoints
            .insert(service_type.into(), url.trim_end_matches('/').to_string());
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn token(&self) -> Result<AuthToken> {
        Ok(AuthToken {
            id: self.token.clone(),
            expires: Utc::now() + Duration::days(365),
            tenant: None,
        })
    }

    async fn endpoint(
        &self,
        service_type: &str,
        _region: Option<&str>,
        _internal: bool,
    ) -> Result<String> {
        self.endpoints
            .get(service_type)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("static endpoint for '{service_type}'")))
    }

    async fn invalidate(&self) {
        // Nothing to refresh
    }

    fn provider_name(&self) -> &str {
        "static"
    }
}
