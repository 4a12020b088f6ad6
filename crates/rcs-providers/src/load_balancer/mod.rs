//! Cloud Load Balancers providers

pub mod cloud;
pub mod in_memory;
pub mod wait;

pub use cloud::CloudLoadBalancerProvider;
pub use in_memory::InMemoryLoadBalancerService;
pub use wait::{wait_for_load_balancer_deletion, wait_for_load_balancer_status};
