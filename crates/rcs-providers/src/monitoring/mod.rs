//! Cloud Monitoring providers

pub mod cloud;
pub mod in_memory;

pub use cloud::CloudMonitoringProvider;
pub use in_memory::InMemoryMonitoringService;
