//! Provider Constants
//!
//! Wire-level constants of the cloud providers. Domain constants (service
//! types, naming limits) live in `rcs_domain::constants`.

// ============================================================================
// HTTP CONSTANTS
// ============================================================================

/// Header carrying the auth token
pub const HEADER_AUTH_TOKEN: &str = "X-Auth-Token";

/// JSON content type
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Plain text content type
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Default request timeout in seconds
pub const HTTP_DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout in seconds
pub const HTTP_DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Longest error body kept in an error message
pub const ERROR_BODY_MAX_CHARS: usize = 512;

// ============================================================================
// RETRY CONSTANTS
// ============================================================================

/// Retries of idempotent requests after a transient failure
pub const RETRY_DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff delay in milliseconds
pub const RETRY_DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;

/// Upper bound of a single backoff delay in milliseconds
pub const RETRY_DEFAULT_MAX_BACKOFF_MS: u64 = 10_000;

// ============================================================================
// POLLING CONSTANTS
// ============================================================================

/// Default delay between status polls in seconds
pub const POLL_DEFAULT_INTERVAL_SECS: u64 = 5;

/// Default polling deadline in seconds
pub const POLL_DEFAULT_TIMEOUT_SECS: u64 = 600;

// ============================================================================
// OBJECT STORAGE CONSTANTS
// ============================================================================

/// Account metadata header prefix
pub const HEADER_ACCOUNT_META_PREFIX: &str = "x-account-meta-";

/// Container metadata header prefix
pub const HEADER_CONTAINER_META_PREFIX: &str = "x-container-meta-";

/// Object metadata header prefix
pub const HEADER_OBJECT_META_PREFIX: &str = "x-object-meta-";

/// Header removing container metadata
pub const HEADER_REMOVE_CONTAINER_META_PREFIX: &str = "X-Remove-Container-Meta-";

/// Header naming the segments of a dynamic large object
pub const HEADER_OBJECT_MANIFEST: &str = "X-Object-Manifest";

/// Header requesting a server-side copy
pub const HEADER_COPY_FROM: &str = "X-Copy-From";

/// Header scheduling object expiry
pub const HEADER_DELETE_AFTER: &str = "X-Delete-After";

/// Header reporting when an object expires, in Unix seconds
pub const HEADER_DELETE_AT: &str = "X-Delete-At";

/// Header receiving CDN purge notifications
pub const HEADER_PURGE_EMAIL: &str = "X-Purge-Email";

/// Maximum paths per bulk delete request
pub const BULK_DELETE_MAX_PATHS: usize = 10_000;

/// Temp URL signature query parameter
pub const TEMP_URL_SIG_PARAM: &str = "temp_url_sig";

/// Temp URL expiry query parameter
pub const TEMP_URL_EXPIRES_PARAM: &str = "temp_url_expires";

// ============================================================================
// LOAD BALANCER CONSTANTS
// ============================================================================

/// Maximum IDs per bulk delete of load balancers, nodes or metadata
pub const LB_BULK_DELETE_MAX_IDS: usize = 10;

// ============================================================================
// IN-MEMORY BACKEND CONSTANTS
// ============================================================================

/// Base URL the in-memory object storage signs temp URLs against
pub const IN_MEMORY_STORAGE_URL: &str = "memory://storage/v1/AUTH_memory";

/// Base URL of links produced by the in-memory Auto Scale backend
pub const IN_MEMORY_AUTOSCALE_URL: &str = "memory://autoscale/v1.0/memory";

/// Base URL of CDN URIs produced by the in-memory object storage
pub const IN_MEMORY_CDN_URL: &str = "memory://cdn";
