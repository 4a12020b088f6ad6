//! HTTP Response Utilities
//!
//! Turns non-success responses into domain errors. The services wrap their
//! error messages differently:
//!
//! | Service | Body |
//! |---------|------|
//! | Load Balancers | `{"message": "...", "code": 422}` |
//! | Auto Scale | `{"badRequest": {"message": "...", "code": 400}}` |
//! | Monitoring | `{"type": "...", "message": "...", "details": "..."}` |
//! | Object Storage | plain text or HTML |

use std::time::Duration;

use rcs_domain::error::Error;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;

use crate::constants::ERROR_BODY_MAX_CHARS;
use crate::utils::JsonExt;

/// Utilities for processing HTTP responses
pub struct HttpResponseUtils;

impl HttpResponseUtils {
    /// Map a non-success status to a domain error
    ///
    /// # Arguments
    /// * `status` - Response status
    /// * `headers` - Response headers (for `Retry-After`)
    /// * `body` - Response body as text
    /// * `resource` - What was requested, used for `NotFound`
    pub fn error_for_status(
        status: StatusCode,
        headers: &HeaderMap,
        body: &str,
        resource: &str,
    ) -> Error {
        let message = Self::error_message(body);
        match status.as_u16() {
            400 => Error::invalid_argument(message),
            401 | 403 => Error::authentication(format!("{status}: {message}")),
            404 => Error::not_found(resource),
            409 | 422 => Error::conflict(message),
            413 | 429 => Error::rate_limited(message, Self::retry_after(headers)),
            code => Error::service(code, message),
        }
    }

    /// Extract the human-readable message of an error body
    pub fn error_message(body: &str) -> String {
        let trimmed = body.trim();
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            if let Some(message) = value.opt_str("message") {
                return Self::with_details(message, value.opt_str("details"));
            }
            // Auto Scale and Identity wrap the fault in a single named object
            if let Some(inner) = value
                .as_object()
                .filter(|map| map.len() == 1)
                .and_then(|map| map.values().next())
            {
                if let Some(message) = inner.opt_str("message") {
                    return Self::with_details(message, inner.opt_str("details"));
                }
            }
        }
        if trimmed.is_empty() {
            return "no response body".to_string();
        }
        trimmed.chars().take(ERROR_BODY_MAX_CHARS).collect()
    }

    /// Parse `Retry-After` given in seconds
    pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
        headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }

    /// Read a header as a string
    pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Read a header as an unsigned integer, defaulting to zero
    pub fn header_u64(headers: &HeaderMap, name: &str) -> u64 {
        Self::header_str(headers, name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Read a `True`/`False` header
    pub fn header_bool(headers: &HeaderMap, name: &str) -> bool {
        Self::header_str(headers, name).is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    fn with_details(message: &str, details: Option<&str>) -> String {
        match details {
            Some(details) if !details.is_empty() => format!("{message} ({details})"),
            _ => message.to_string(),
        }
    }
}
