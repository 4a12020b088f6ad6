//! Error handling types

use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for RCS
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Generic string-based error
    #[error("String error: {0}")]
    String(String),

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to a function or rejected by the service
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// The request conflicts with the current state of the resource
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },

    /// The service is throttling the account
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Description returned by the service
        message: String,
        /// Delay requested by the service before retrying
        retry_after: Option<Duration>,
    },

    /// Unexpected status code returned by a service
    #[error("Service error ({status}): {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Response body or description
        message: String,
    },

    /// An operation did not complete before its deadline
    #[error("Timed out after {elapsed:?}: {operation}")]
    Timeout {
        /// Operation that was being waited on
        operation: String,
        /// Time spent waiting
        elapsed: Duration,
    },

    /// Configuration-related error (simple form)
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Configuration-related error (with source)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication-related error
    #[error("Authentication error: {message}")]
    Authentication {
        /// Description of the authentication error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network-related error
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// Several independent operations failed
    #[error("{} operation(s) failed: {}", .errors.len(), summarize(.errors))]
    Aggregate {
        /// Every failure, in completion order
        errors: Vec<Error>,
    },
}

fn summarize(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a service error for an unexpected status code
    pub fn service<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    /// Create a rate-limit error
    pub fn rate_limited<S: Into<String>>(message: S, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after,
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, elapsed: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed,
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error (simple)
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Authentication error creation methods
impl Error {
    /// Create an authentication error
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
            source: None,
        }
    }

    /// Create an authentication error with source
    pub fn authentication_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Authentication {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Network error creation methods
impl Error {
    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source
    pub fn network_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Aggregation
impl Error {
    /// Fold a list of failures into a single error
    ///
    /// Returns `None` when the list is empty and the error itself when it
    /// holds exactly one failure.
    pub fn aggregate(mut errors: Vec<Error>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate { errors }),
        }
    }
}

// Classification
impl Error {
    /// Whether the error reports a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the error reports a resource in the wrong state
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether repeating the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimited { .. } => true,
            Self::Service { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
