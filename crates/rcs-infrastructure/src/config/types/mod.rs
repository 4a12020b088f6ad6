//! Configuration types module

pub mod app;
pub mod http;
pub mod identity;
pub mod logging;
pub mod object_storage;
pub mod providers;
pub mod resilience;

// Re-export main types
pub use app::*;
