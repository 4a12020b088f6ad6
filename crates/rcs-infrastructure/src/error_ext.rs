//! Error extension utilities
//!
//! Context extension methods converting foreign errors into the domain
//! [`Error`] type.

use rcs_domain::error::{Error, Result};
use std::fmt;

/// Extension trait for adding context to errors from I/O, figment and
/// tracing-subscriber
///
/// # Example
///
/// ```ignore
/// use rcs_infrastructure::error_ext::ErrorContext;
///
/// let content = std::fs::read_to_string(&path)
///     .io_context(format!("Failed to read config file: {}", path.display()))?;
///
/// let config: AppConfig = figment
///     .extract()
///     .config_context("Failed to extract configuration")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context for I/O operations
    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context for configuration operations
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Io {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }

    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Configuration {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }
}
