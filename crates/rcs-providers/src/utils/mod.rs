//! Provider Utilities
//!
//! Shared utilities used by provider implementations.

mod http_response;
mod json;
mod paging;
pub mod polling;

pub use http_response::HttpResponseUtils;
pub use json::JsonExt;
pub use paging::page_by_key;
pub use polling::{Poll, PollOptions, poll_until};
