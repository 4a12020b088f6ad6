//! # RCS - Provider Implementations
//!
//! Implementations of the service ports defined in `rcs-domain`: REST
//! clients for the live cloud APIs and in-memory backends that simulate
//! them for tests and offline runs.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Identity | `IdentityProvider` | Keystone, Static |
//! | Auto Scale | `AutoScaleService` | Cloud, InMemory |
//! | Load Balancers | `LoadBalancerService` | Cloud, InMemory |
//! | Monitoring | `MonitoringService` | Cloud, InMemory |
//! | Object Storage | `ObjectStorageProvider` | CloudFiles, InMemory |
//!
//! ## Usage
//!
//! ```ignore
//! use rcs_providers::identity::{Credentials, KeystoneIdentityProvider};
//! use rcs_providers::object_storage::CloudFilesProvider;
//!
//! let identity = Arc::new(KeystoneIdentityProvider::new(auth_url, credentials, &config)?);
//! let storage = CloudFilesProvider::connect(identity, Some("ORD"), false, &config).await?;
//! ```

// Re-export rcs-domain types commonly used with providers
pub use rcs_domain::error::{Error, Result};
pub use rcs_domain::ports::{
    AutoScaleService, IdentityProvider, LoadBalancerService, MonitoringService,
    ObjectStorageProvider,
};

/// Provider-specific constants
pub mod constants;

/// Shared utilities for provider implementations
pub mod utils;

/// HTTP plumbing shared by the cloud providers
pub mod http;

/// Identity providers (token and service catalog)
pub mod identity;

/// Auto Scale providers
pub mod autoscale;

/// Cloud Load Balancers providers
pub mod load_balancer;

/// Cloud Monitoring providers
pub mod monitoring;

/// Object storage providers
pub mod object_storage;

pub use autoscale::{CloudAutoScaleProvider, InMemoryAutoScaleService};
pub use http::{HttpClientConfig, RestClient, RetryPolicy};
pub use identity::{Credentials, KeystoneIdentityProvider, StaticIdentityProvider};
pub use load_balancer::{
    CloudLoadBalancerProvider, InMemoryLoadBalancerService, wait_for_load_balancer_deletion,
    wait_for_load_balancer_status,
};
pub use monitoring::{CloudMonitoringProvider, InMemoryMonitoringService};
pub use object_storage::{CloudFilesProvider, InMemoryObjectStorage, TempUrlSigner};
pub use utils::{PollOptions, poll_until};
