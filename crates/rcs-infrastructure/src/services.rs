//! Service composition root
//!
//! Builds the four service ports for the configured backend. Callers hold
//! `Arc<dyn …>` handles and never name a concrete provider.

use std::sync::Arc;

use bytes::Bytes;
use rcs_domain::error::Result;
use rcs_domain::ports::{
    AutoScaleService, LoadBalancerService, MonitoringService, ObjectStorageProvider,
    SharedIdentityProvider,
};
use rcs_domain::value_objects::CreateObjectOptions;
use rcs_providers::{
    CloudAutoScaleProvider, CloudFilesProvider, CloudLoadBalancerProvider,
    CloudMonitoringProvider, InMemoryAutoScaleService, InMemoryLoadBalancerService,
    InMemoryMonitoringService, InMemoryObjectStorage, KeystoneIdentityProvider,
    StaticIdentityProvider,
};
use tracing::info;

use crate::config::{AppConfig, Backend, IdentityConfig};
use crate::constants::DEFAULT_SEGMENT_SIZE;

/// Handles to every service port
#[derive(Clone)]
pub struct CloudServices {
    backend: Backend,
    segment_size: usize,
    /// Auto Scale groups, policies and webhooks
    pub autoscale: Arc<dyn AutoScaleService>,
    /// Load balancers and their sub-resources
    pub load_balancers: Arc<dyn LoadBalancerService>,
    /// Monitoring entities, checks, alarms and notifications
    pub monitoring: Arc<dyn MonitoringService>,
    /// Containers, objects and CDN
    pub object_storage: Arc<dyn ObjectStorageProvider>,
}

impl std::fmt::Debug for CloudServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudServices")
            .field("backend", &self.backend)
            .field("segment_size", &self.segment_size)
            .finish_non_exhaustive()
    }
}

impl CloudServices {
    /// Build the services selected by `config.providers.backend`
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        match config.providers.backend {
            Backend::InMemory => {
                Ok(Self::in_memory().with_segment_size(config.object_storage.segment_size))
            }
            Backend::Cloud => Self::cloud(config).await,
        }
    }

    /// Fresh, empty in-memory backends
    pub fn in_memory() -> Self {
        info!(backend = %Backend::InMemory, "services ready");
        Self {
            backend: Backend::InMemory,
            segment_size: DEFAULT_SEGMENT_SIZE,
            autoscale: Arc::new(InMemoryAutoScaleService::new()),
            load_balancers: Arc::new(InMemoryLoadBalancerService::new()),
            monitoring: Arc::new(InMemoryMonitoringService::new()),
            object_storage: Arc::new(InMemoryObjectStorage::new()),
        }
    }

    /// Cloud REST providers sharing one identity provider
    ///
    /// Endpoints are resolved from the service catalog; the first call
    /// authenticates unless a pre-issued token is configured.
    pub async fn cloud(config: &AppConfig) -> Result<Self> {
        let http = config.http.client_config();
        let identity = identity_provider(&config.identity, &http)?;
        let region = config.region.as_deref();

        let (autoscale, load_balancers, monitoring, object_storage) = tokio::try_join!(
            CloudAutoScaleProvider::connect(identity.clone(), region, &http),
            CloudLoadBalancerProvider::connect(identity.clone(), region, &http),
            CloudMonitoringProvider::connect(identity.clone(), region, &http),
            CloudFilesProvider::connect(
                identity.clone(),
                region,
                config.object_storage.internal_url,
                &http,
            ),
        )?;

        info!(backend = %Backend::Cloud, region = ?region, "services ready");
        Ok(Self {
            backend: Backend::Cloud,
            segment_size: config.object_storage.segment_size,
            autoscale: Arc::new(autoscale),
            load_balancers: Arc::new(load_balancers),
            monitoring: Arc::new(monitoring),
            object_storage: Arc::new(object_storage),
        })
    }

    /// Backend the services were built for
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Use `segment_size` bytes per segment for [`Self::upload_object`]
    #[must_use]
    pub fn with_segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size;
        self
    }

    /// Largest object uploaded in one request; bigger ones are segmented
    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Upload an object, splitting it into segments under a manifest when
    /// it exceeds the configured segment size
    ///
    /// Returns the number of segments written, zero for a plain object.
    pub async fn upload_object(
        &self,
        container: &str,
        name: &str,
        data: Bytes,
        options: &CreateObjectOptions,
    ) -> Result<usize> {
        if data.len() <= self.segment_size {
            self.object_storage
                .create_object(container, name, data, options)
                .await?;
            return Ok(0);
        }
        let segments = self
            .object_storage
            .upload_segmented(container, name, data, self.segment_size, options)
            .await?;
        info!(container, object = name, segments, "segmented upload finished");
        Ok(segments)
    }
}

/// Identity provider for the configured credentials
///
/// A pre-issued token yields a [`StaticIdentityProvider`]; otherwise a
/// [`KeystoneIdentityProvider`] authenticating with the credentials.
pub fn identity_provider(
    identity: &IdentityConfig,
    http: &rcs_providers::HttpClientConfig,
) -> Result<SharedIdentityProvider> {
    if let Some(token) = identity.token.as_deref().filter(|_| identity.uses_static_token()) {
        let provider = identity
            .endpoints
            .iter()
            .fold(StaticIdentityProvider::new(token), |provider, (service, url)| {
                provider.with_endpoint(service.as_str(), url.as_str())
            });
        return Ok(Arc::new(provider));
    }

    let mut provider =
        KeystoneIdentityProvider::new(identity.auth_url.as_str(), identity.credentials()?, http)?;
    if let Some(region) = identity.default_region.as_deref() {
        provider = provider.with_default_region(region);
    }
    Ok(Arc::new(provider))
}
