//! Domain layer constants
//!
//! Service catalog types, resource naming limits and pagination defaults.
//! Wire-level constants (header names, URL fragments) live in
//! `rcs_providers::constants`.

// ============================================================================
// SERVICE CATALOG TYPES
// ============================================================================

/// Catalog type of the Auto Scale service
pub const SERVICE_TYPE_AUTOSCALE: &str = "rax:autoscale";

/// Catalog type of the Cloud Load Balancers service
pub const SERVICE_TYPE_LOAD_BALANCER: &str = "rax:load-balancer";

/// Catalog type of the Cloud Monitoring service
pub const SERVICE_TYPE_MONITORING: &str = "rax:monitor";

/// Catalog type of the object storage service
pub const SERVICE_TYPE_OBJECT_STORE: &str = "object-store";

/// Catalog type of the object storage CDN management service
pub const SERVICE_TYPE_OBJECT_CDN: &str = "rax:object-cdn";

// ============================================================================
// IDENTITY CONSTANTS
// ============================================================================

/// Tokens expiring within this many seconds are treated as expired
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

// ============================================================================
// OBJECT STORAGE CONSTANTS
// ============================================================================

/// Maximum length of a container name in bytes
pub const MAX_CONTAINER_NAME_LENGTH: usize = 256;

/// Maximum length of an object name in bytes
pub const MAX_OBJECT_NAME_LENGTH: usize = 1024;

/// Maximum size of a single uploaded object (5 GiB)
pub const MAX_SINGLE_OBJECT_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Account metadata key holding the temp URL signing key
pub const TEMP_URL_KEY_METADATA: &str = "temp-url-key";

// ============================================================================
// AUTO SCALE CONSTANTS
// ============================================================================

/// Maximum cooldown accepted by the Auto Scale API (one day)
pub const AUTOSCALE_MAX_COOLDOWN_SECS: u32 = 86_400;

/// Maximum entities accepted by the Auto Scale API for a single group
pub const AUTOSCALE_MAX_ENTITIES: u32 = 1000;

// ============================================================================
// PAGINATION CONSTANTS
// ============================================================================

/// Page size used by `list_all_*` helpers when none is given
pub const DEFAULT_PAGE_SIZE: usize = 100;
