//! Identity configuration types

use crate::constants::DEFAULT_IDENTITY_URL;
use rcs_domain::error::{Error, Result};
use rcs_providers::identity::Credentials;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity (Keystone v2.0) configuration
///
/// Either a pre-issued `token` with its `endpoints`, or a `username` with an
/// `api_key` or `password`. The API key wins when both secrets are present.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdentityConfig {
    /// Identity endpoint including the version
    pub auth_url: String,

    /// Account user name
    pub username: Option<String>,

    /// Rackspace API key
    pub api_key: Option<String>,

    /// Account password
    pub password: Option<String>,

    /// Tenant to scope password tokens to
    pub tenant_name: Option<String>,

    /// Overrides the user's default region reported by the identity service
    pub default_region: Option<String>,

    /// Pre-issued token; skips authentication entirely
    pub token: Option<String>,

    /// Service type to base URL, used with `token`
    pub endpoints: HashMap<String, String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_IDENTITY_URL.to_string(),
            username: None,
            api_key: None,
            password: None,
            tenant_name: None,
            default_region: None,
            token: None,
            endpoints: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("IdentityConfig")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("api_key", &redact(&self.api_key))
            .field("password", &redact(&self.password))
            .field("tenant_name", &self.tenant_name)
            .field("default_region", &self.default_region)
            .field("token", &redact(&self.token))
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl IdentityConfig {
    /// Whether a pre-issued token is configured
    pub fn uses_static_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Credentials for the identity service
    ///
    /// # Errors
    ///
    /// `Error::Configuration` when the user name or both secrets are missing.
    pub fn credentials(&self) -> Result<Credentials> {
        let username = non_empty(self.username.as_ref())
            .ok_or_else(|| Error::config("identity.username is required"))?;

        if let Some(api_key) = non_empty(self.api_key.as_ref()) {
            return Ok(Credentials::ApiKey {
                username,
                api_key,
            });
        }
        if let Some(password) = non_empty(self.password.as_ref()) {
            return Ok(Credentials::Password {
                username,
                password,
                tenant_name: non_empty(self.tenant_name.as_ref()),
            });
        }
        Err(Error::config(
            "identity.api_key or identity.password is required",
        ))
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}
