//! Identity Provider Port
//!
//! Every cloud provider asks the identity provider for a valid token before
//! each request and for its base URL once, at construction.

use crate::error::Result;
use crate::value_objects::AuthToken;
use async_trait::async_trait;
use std::sync::Arc;

/// Token issuer and service catalog
///
/// # Example
///
/// ```ignore
/// let token = identity.token().await?;
/// let url = identity.endpoint("rax:load-balancer", Some("DFW"), false).await?;
/// ```
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Return a token that is valid for at least the refresh margin
    ///
    /// Implementations cache the token and only re-authenticate when it
    /// is about to expire or was invalidated.
    async fn token(&self) -> Result<AuthToken>;

    /// Resolve the base URL of a service
    ///
    /// # Arguments
    /// * `service_type` - Catalog type, e.g. `object-store`
    /// * `region` - Region override; `None` uses the user's default region
    /// * `internal` - Prefer the internal (ServiceNet) URL when published
    async fn endpoint(
        &self,
        service_type: &str,
        region: Option<&str>,
        internal: bool,
    ) -> Result<String>;

    /// Drop the cached token so the next call re-authenticates
    ///
    /// Called after the service rejected a token with 401.
    async fn invalidate(&self);

    /// Name of this identity provider (e.g. "keystone", "static")
    fn provider_name(&self) -> &str;
}

/// Shared identity provider handle
pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;
