//! Auto Scale provider implementations
//!
//! | Provider | Description |
//! |----------|-------------|
//! | [`CloudAutoScaleProvider`] | Auto Scale v1.0 REST API |
//! | [`InMemoryAutoScaleService`] | Simulated backend for tests and offline runs |

pub mod cloud;
pub mod in_memory;

pub use cloud::CloudAutoScaleProvider;
pub use in_memory::InMemoryAutoScaleService;
