//! Domain Port Interfaces
//!
//! Contracts between the domain and the layers that talk to the network.
//!
//! ## Organization
//!
//! - **infrastructure/** - Identity (token issuing and endpoint resolution)
//! - **providers/** - One port per cloud service
//!
//! Every port has a cloud implementation and an in-memory implementation in
//! `rcs-providers`.

/// Infrastructure service ports
pub mod infrastructure;
/// Cloud service ports
pub mod providers;

pub use infrastructure::{IdentityProvider, SharedIdentityProvider};
pub use providers::{
    AutoScaleService, LoadBalancerService, MonitoringService, ObjectStorageProvider,
};
