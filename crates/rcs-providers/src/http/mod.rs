//! HTTP Plumbing
//!
//! Everything the cloud providers share: client configuration, request
//! description and the authenticated REST client with status mapping and
//! retries.
//!
//! ## Contents
//!
//! - `HttpClientConfig` - Timeouts, user agent and retry policy
//! - `RestRequest` - Method, path segments, query, headers and body of one call
//! - `RestClient` - Sends requests with the current token and maps failures
//! - `RestResponse` - Successful response with helpers for headers and JSON

pub mod client;
pub mod config;
pub mod request;

pub use client::{RestClient, RestResponse};
pub use config::{HttpClientConfig, RetryPolicy};
pub use request::RestRequest;
// Re-export HttpResponseUtils from utils for convenience
pub use crate::utils::HttpResponseUtils;
