//! Identity value objects
//!
//! The identity service returns an auth token together with a service
//! catalog: for each service type, the endpoints available in each region.
//! Providers resolve their base URL from that catalog.

use crate::constants::TOKEN_REFRESH_MARGIN_SECS;
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Value Object: Authentication Token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Token value sent as `X-Auth-Token`
    pub id: String,
    /// Expiration instant
    pub expires: DateTime<Utc>,
    /// Tenant the token is scoped to
    #[serde(default)]
    pub tenant: Option<Tenant>,
}

impl AuthToken {
    /// Whether the token expires within the refresh margin of `now`
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires - now <= Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)
    }
}

/// Tenant (account) a token is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant identifier
    pub id: String,
    /// Tenant display name
    #[serde(default)]
    pub name: Option<String>,
}

/// One endpoint of a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Region code, absent for global services
    #[serde(default)]
    pub region: Option<String>,
    /// Tenant the endpoint belongs to
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Public URL
    #[serde(rename = "publicURL")]
    pub public_url: String,
    /// Internal (ServiceNet) URL
    #[serde(rename = "internalURL", default)]
    pub internal_url: Option<String>,
}

/// All endpoints of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Service name (e.g. `cloudFiles`)
    pub name: String,
    /// Service type (e.g. `object-store`)
    #[serde(rename = "type")]
    pub service_type: String,
    /// Endpoints by region
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Value Object: Service Catalog
///
/// ## Business Rules
///
/// - An explicit region wins; otherwise the user's default region is used
/// - A region-less endpoint serves any region (global services such as Monitoring)
/// - Region codes compare case-insensitively
/// - Internal URLs are only used when requested and published
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    entries: Vec<CatalogEntry>,
}

impl ServiceCatalog {
    /// Build a catalog from its entries
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// All catalog entries
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Resolve the base URL of a service
    ///
    /// # Arguments
    /// * `service_type` - Catalog type, e.g. `rax:load-balancer`
    /// * `region` - Preferred region, falls back to `default_region`
    /// * `default_region` - The user's default region from the identity response
    /// * `internal` - Prefer the internal (ServiceNet) URL
    pub fn resolve(
        &self,
        service_type: &str,
        region: Option<&str>,
        default_region: Option<&str>,
        internal: bool,
    ) -> Result<String> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.service_type == service_type)
            .ok_or_else(|| {
                Error::not_found(format!("service '{service_type}' in service catalog"))
            })?;

        let wanted = region.or(default_region);
        let endpoint = wanted
            .and_then(|wanted| {
                entry.endpoints.iter().find(|e| {
                    e.region
                        .as_deref()
                        .is_some_and(|r| r.eq_ignore_ascii_case(wanted))
                })
            })
            .or_else(|| entry.endpoints.iter().find(|e| e.region.is_none()))
            .ok_or_else(|| {
                Error::not_found(format!(
                    "endpoint for '{}' in region '{}'",
                    service_type,
                    wanted.unwrap_or("<none>")
                ))
            })?;

        let url = match (&endpoint.internal_url, internal) {
            (Some(internal_url), true) => internal_url,
            _ => &endpoint.public_url,
        };
        Ok(url.trim_end_matches('/').to_string())
    }
}

/// Value Object: Access Information
///
/// Everything the identity service returned for one authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessInfo {
    /// Issued token
    pub token: AuthToken,
    /// Service catalog
    pub catalog: ServiceCatalog,
    /// Region the user defaults to
    pub default_region: Option<String>,
}
