//! Integration test harness
//!
//! Resolves the service ports from configuration and hands scenarios the
//! pieces they share: unique names under one prefix, polling settings
//! suited to the backend, and a cleanup pass.

use std::sync::Arc;
use std::time::Duration;

use rcs_domain::error::{Error, Result};
use rcs_domain::ports::{
    AutoScaleService, LoadBalancerService, MonitoringService, ObjectStorageProvider,
};
use rcs_domain::value_objects::{LoadBalancer, LoadBalancerId, LoadBalancerStatus};
use rcs_infrastructure::{AppConfig, Backend, CloudServices, ConfigLoader};
use rcs_providers::{PollOptions, wait_for_load_balancer_deletion, wait_for_load_balancer_status};
use uuid::Uuid;

use crate::cleanup;

/// Prefix of every resource the suites create
///
/// Cleanup removes anything carrying it, including leftovers of earlier
/// interrupted runs.
pub const TEST_PREFIX: &str = "rcs-it";

/// Segment size of in-memory runs, small enough that scenarios segment
const IN_MEMORY_SEGMENT_SIZE: usize = 1024;

/// Services plus the settings scenarios need
pub struct TestHarness {
    config: AppConfig,
    services: CloudServices,
}

impl std::fmt::Debug for TestHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestHarness")
            .field("backend", &self.services.backend())
            .field("region", &self.config.region)
            .finish_non_exhaustive()
    }
}

impl TestHarness {
    /// Fresh in-memory services
    pub fn in_memory() -> Self {
        let mut config = AppConfig::default();
        config.object_storage.segment_size = IN_MEMORY_SEGMENT_SIZE;
        let services = CloudServices::in_memory().with_segment_size(IN_MEMORY_SEGMENT_SIZE);
        Self { config, services }
    }

    /// Services for the loaded configuration (`rcs.toml` and `RCS__*`)
    pub async fn from_env() -> Result<Self> {
        let config = ConfigLoader::new().load()?;
        Self::from_config(config).await
    }

    /// Live cloud services; refuses any other backend
    pub async fn live() -> Result<Self> {
        let harness = Self::from_env().await?;
        if harness.is_live() {
            Ok(harness)
        } else {
            Err(Error::config(
                "live suites need RCS__PROVIDERS__BACKEND=cloud and credentials",
            ))
        }
    }

    /// Services for an explicit configuration
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let services = CloudServices::from_config(&config).await?;
        tracing::info!(backend = %services.backend(), "test harness ready");
        Ok(Self { config, services })
    }

    /// Whether scenarios talk to the real cloud
    pub fn is_live(&self) -> bool {
        self.services.backend() == Backend::Cloud
    }

    /// Configuration the services were built from
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// All service handles
    pub fn services(&self) -> &CloudServices {
        &self.services
    }

    /// Configured segment size of large uploads
    pub fn segment_size(&self) -> usize {
        self.services.segment_size()
    }

    /// Auto Scale service
    pub fn autoscale(&self) -> &Arc<dyn AutoScaleService> {
        &self.services.autoscale
    }

    /// Load balancer service
    pub fn load_balancers(&self) -> &Arc<dyn LoadBalancerService> {
        &self.services.load_balancers
    }

    /// Monitoring service
    pub fn monitoring(&self) -> &Arc<dyn MonitoringService> {
        &self.services.monitoring
    }

    /// Object storage service
    pub fn object_storage(&self) -> &Arc<dyn ObjectStorageProvider> {
        &self.services.object_storage
    }

    /// Name no other resource has, e.g. `rcs-it-container-1f0c2a9d3b7e`
    pub fn unique_name(&self, kind: &str) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{TEST_PREFIX}-{kind}-{}", &suffix[..12])
    }

    /// Polling cadence for asynchronous resources
    ///
    /// In-memory resources settle on the next read, so polling is tight.
    pub fn poll_options(&self) -> PollOptions {
        if self.is_live() {
            self.config.resilience.poll_options()
        } else {
            PollOptions::new(Duration::from_millis(1), Duration::from_secs(5))
        }
    }

    /// Wait until a load balancer accepts changes again
    pub async fn wait_for_active(&self, id: &LoadBalancerId) -> Result<LoadBalancer> {
        wait_for_load_balancer_status(
            self.load_balancers().as_ref(),
            id,
            LoadBalancerStatus::Active,
            &self.poll_options(),
        )
        .await
    }

    /// Wait until a deleted load balancer is gone
    pub async fn wait_for_deletion(&self, id: &LoadBalancerId) -> Result<()> {
        wait_for_load_balancer_deletion(self.load_balancers().as_ref(), id, &self.poll_options())
            .await
    }

    /// Remove every resource carrying [`TEST_PREFIX`] from all services
    pub async fn cleanup(&self) -> Result<()> {
        let poll = self.poll_options();
        cleanup::run_all([
            cleanup::boxed(cleanup::autoscale::cleanup_groups(
                self.autoscale().as_ref(),
                TEST_PREFIX,
            )),
            cleanup::boxed(cleanup::load_balancer::cleanup_load_balancers(
                self.load_balancers().as_ref(),
                TEST_PREFIX,
                poll,
            )),
            cleanup::boxed(cleanup::monitoring::cleanup_monitoring(
                self.monitoring().as_ref(),
                TEST_PREFIX,
            )),
            cleanup::boxed(cleanup::object_storage::cleanup_containers(
                self.object_storage().as_ref(),
                TEST_PREFIX,
            )),
        ])
        .await
    }
}
