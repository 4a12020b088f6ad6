//! # RCS Domain Layer
//!
//! Resource models, service ports and pagination primitives for the
//! Rackspace/OpenStack-compatible cloud services covered by RCS.
//!
//! Nothing in this crate performs I/O. Concrete implementations of the
//! ports live in `rcs-providers`; configuration and composition live in
//! `rcs-infrastructure`.
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Domain error type and `Result` alias |
//! | [`constants`] | Service types, naming limits, pagination defaults |
//! | [`value_objects`] | Resource models for every service |
//! | [`pagination`] | Marker-based paging, `collect_all` and `paginate` |
//! | [`ports`] | Service and identity provider traits |

/// Domain constants
pub mod constants;
/// Error handling types
pub mod error;
/// Marker-based pagination
pub mod pagination;
/// Service and identity ports
pub mod ports;
/// Resource models
pub mod value_objects;

pub use error::{Error, Result};
pub use pagination::{Page, PageRequest, collect_all, paginate};
pub use ports::{
    AutoScaleService, IdentityProvider, LoadBalancerService, MonitoringService,
    ObjectStorageProvider,
};
