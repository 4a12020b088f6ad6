//! Cloud Service Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | AutoScaleService | Scaling groups, policies and webhooks |
//! | LoadBalancerService | Load balancers, nodes and their settings |
//! | MonitoringService | Entities, checks, alarms and notifications |
//! | ObjectStorageProvider | Containers, objects, CDN and temp URLs |

/// Auto Scale port
pub mod autoscale;
/// Cloud Load Balancers port
pub mod load_balancer;
/// Cloud Monitoring port
pub mod monitoring;
/// Object storage port
pub mod object_storage;

pub use autoscale::AutoScaleService;
pub use load_balancer::LoadBalancerService;
pub use monitoring::MonitoringService;
pub use object_storage::ObjectStorageProvider;
