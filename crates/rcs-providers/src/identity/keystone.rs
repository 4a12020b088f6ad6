//! Identity v2.0 provider
//!
//! Authenticates with `POST {auth_url}/tokens` using either Rackspace API-key
//! credentials or username/password, caches the returned token and service
//! catalog, and re-authenticates when the token is about to expire or a
//! service rejected it.

use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use rcs_domain::error::{Error, Result};
use rcs_domain::ports::IdentityProvider;
use rcs_domain::value_objects::{AccessInfo, AuthToken, ServiceCatalog};

use crate::constants::CONTENT_TYPE_JSON;
use crate::http::HttpClientConfig;
use crate::utils::HttpResponseUtils;

/// Credentials accepted by the identity service
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Rackspace API key
    ApiKey {
        /// Account user name
        username: String,
        /// API key
        api_key: String,
    },
    /// Username and password, optionally scoped to a tenant
    Password {
        /// Account user name
        username: String,
        /// Password
        password: String,
        /// Tenant to scope the token to
        tenant_name: Option<String>,
    },
}

impl Credentials {
    /// User the credentials belong to
    pub fn username(&self) -> &str {
        match self {
            Self::ApiKey { username, .. } | Self::Password { username, .. } => username,
        }
    }

    fn auth_body(&self) -> Value {
        match self {
            Self::ApiKey { username, api_key } => json!({
                "auth": {
                    "RAX-KSKEY:apiKeyCredentials": {
                        "username": username,
                        "apiKey": api_key,
                    }
                }
            }),
            Self::Password {
                username,
                password,
                tenant_name,
            } => {
                let mut auth = json!({
                    "passwordCredentials": {
                        "username": username,
                        "password": password,
                    }
                });
                if let Some(tenant) = tenant_name {
                    auth["tenantName"] = json!(tenant);
                }
                json!({ "auth": auth })
            }
        }
    }
}

// Secrets never reach logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { username, .. } => f
                .debug_struct("ApiKey")
                .field("username", username)
                .field("api_key", &"<redacted>")
                .finish(),
            Self::Password {
                username,
                tenant_name,
                ..
            } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("tenant_name", tenant_name)
                .finish(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access: AccessResponse,
}

#[derive(Deserialize)]
struct AccessResponse {
    token: AuthToken,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: ServiceCatalog,
    #[serde(default)]
    user: Option<UserResponse>,
}

#[derive(Deserialize)]
struct UserResponse {
    #[serde(rename = "RAX-AUTH:defaultRegion", default)]
    default_region: Option<String>,
}

/// Identity v2.0 provider with token caching
///
/// # Example
///
/// ```ignore
/// let identity = KeystoneIdentityProvider::new(
///     "https://identity.api.rackspacecloud.com/v2.0",
///     Credentials::ApiKey { username: "demo".into(), api_key: "secret".into() },
///     &HttpClientConfig::default(),
/// )?;
/// let token = identity.token().await?;
/// ```
pub struct KeystoneIdentityProvider {
    auth_url: String,
    credentials: Credentials,
    default_region: Option<String>,
    http_client: Client,
    access: Mutex<Option<AccessInfo>>,
}

impl KeystoneIdentityProvider {
    /// Create a provider; no request is made until a token is needed
    ///
    /// # Arguments
    /// * `auth_url` - Identity endpoint including the version (`.../v2.0`)
    /// * `credentials` - API key or password credentials
    /// * `config` - HTTP settings for the identity requests
    pub fn new<S: Into<String>>(
        auth_url: S,
        credentials: Credentials,
        config: &HttpClientConfig,
    ) -> Result<Self> {
        Ok(Self {
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            credentials,
            default_region: None,
            http_client: config.build_client()?,
            access: Mutex::new(None),
        })
    }

    /// Override the user's default region from the identity response
    #[must_use]
    pub fn with_default_region<S: Into<String>>(mut self, region: S) -> Self {
        self.default_region = Some(region.into());
        self
    }

    /// Authenticate now, replacing any cached token
    pub async fn authenticate(&self) -> Result<AccessInfo> {
        let access = self.request_token().await?;
        *self.access.lock().await = Some(access.clone());
        Ok(access)
    }

    async fn request_token(&self) -> Result<AccessInfo> {
        let url = format!("{}/tokens", self.auth_url);
        tracing::debug!(username = self.credentials.username(), %url, "authenticating");

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(reqwest::header::ACCEPT, CONTENT_TYPE_JSON)
            .body(self.credentials.auth_body().to_string())
            .send()
            .await
            .map_err(|e| Error::network_with_source(format!("identity request to {url} failed"), e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network_with_source("reading identity response", e))?;

        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::authentication(format!(
                    "identity service rejected credentials for '{}': {}",
                    self.credentials.username(),
                    HttpResponseUtils::error_message(&body)
                )),
                _ => HttpResponseUtils::error_for_status(status, &headers, &body, &url),
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            Error::authentication_with_source("malformed identity response", e)
        })?;
        let default_region = self
            .default_region
            .clone()
            .or_else(|| parsed.access.user.and_then(|u| u.default_region));

        tracing::info!(
            username = self.credentials.username(),
            expires = %parsed.access.token.expires,
            region = default_region.as_deref().unwrap_or("<none>"),
            "authenticated"
        );

        Ok(AccessInfo {
            token: parsed.access.token,
            catalog: parsed.access.service_catalog,
            default_region,
        })
    }

    /// Cached access info, re-authenticating when missing or stale
    async fn current_access(&self) -> Result<AccessInfo> {
        let mut guard = self.access.lock().await;
        if let Some(access) = guard.as_ref() {
            if !access.token.needs_refresh(Utc::now()) {
                return Ok(access.clone());
            }
            tracing::debug!("cached token is about to expire");
        }
        let access = self.request_token().await?;
        *guard = Some(access.clone());
        Ok(access)
    }
}

#[async_trait]
impl IdentityProvider for KeystoneIdentityProvider {
    async fn token(&self) -> Result<AuthToken> {
        Ok(self.current_access().await?.token)
    }

    async fn endpoint(
        &self,
        service_type: &str,
        region: Option<&str>,
        internal: bool,
    ) -> Result<String> {
        let access = self.current_access().await?;
        access.catalog.resolve(
            service_type,
            region,
            access.default_region.as_deref(),
            internal,
        )
    }

    async fn invalidate(&self) {
        *self.access.lock().await = None;
    }

    fn provider_name(&self) -> &str {
        "keystone"
    }
}
