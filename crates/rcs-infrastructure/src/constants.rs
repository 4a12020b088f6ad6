//! Infrastructure layer constants
//!
//! Provider-level defaults (timeouts, retry, polling) live in
//! `rcs_providers::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "rcs.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "rcs";

/// Environment variable prefix for configuration (`RCS__SECTION__KEY`)
pub const CONFIG_ENV_PREFIX: &str = "RCS";

/// Separator between nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Default identity endpoint (Rackspace Cloud Identity v2.0)
pub const DEFAULT_IDENTITY_URL: &str = "https://identity.api.rackspacecloud.com/v2.0";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the configured log filter
pub const LOG_FILTER_ENV: &str = "RCS_LOG";

/// File name prefix of the rolling log file when the path has no stem
pub const DEFAULT_LOG_FILE_PREFIX: &str = "rcs";

// ============================================================================
// OBJECT STORAGE CONSTANTS
// ============================================================================

/// Default segment size for segmented uploads (1 GiB)
pub const DEFAULT_SEGMENT_SIZE: usize = 1024 * 1024 * 1024;
