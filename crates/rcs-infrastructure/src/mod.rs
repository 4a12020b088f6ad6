//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns that wire the providers together.
//!
//! ## Module Categories
//!
//! ### Configuration & Composition
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment configuration (defaults, TOML, `RCS__` environment) |
//! | [`services`] | Builds the service ports for the configured backend |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability & Errors
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//! | [`error_ext`] | Context extension for foreign errors |

pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;
pub mod services;

// Re-export commonly used types
pub use config::{AppConfig, Backend, ConfigLoader};
pub use error_ext::ErrorContext;
pub use services::CloudServices;
