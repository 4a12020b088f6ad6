//! Configuration loader
//!
//! Handles loading configuration from various sources including
//! TOML files, environment variables, and default values.

use crate::config::{AppConfig, Backend, IdentityConfig, LoggingConfig};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use rcs_domain::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    #[must_use]
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (explicit path, or the first `rcs.toml` found)
    /// 3. Environment variables with prefix (e.g., `RCS__IDENTITY__USERNAME`)
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            } else {
                log_config_loaded(config_path, false);
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        // Double underscore separates nested keys (RCS__PROVIDERS__BACKEND)
        figment = figment.merge(
            Env::prefixed(&format!("{}{CONFIG_ENV_SEPARATOR}", self.env_prefix))
                .split(CONFIG_ENV_SEPARATOR),
        );

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context("Failed to write config file")?;

        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// First existing file among the usual locations
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
            dirs::home_dir().map(|d| {
                d.join(format!(".{DEFAULT_CONFIG_DIR}"))
                    .join(DEFAULT_CONFIG_FILENAME)
            }),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
///
/// Performs validation of every configuration section.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_identity_config(config)?;
    validate_http_config(config)?;
    validate_resilience_config(config)?;
    validate_object_storage_config(config)?;
    parse_log_level(&config.logging.level)?;
    Ok(())
}

fn validate_identity_config(config: &AppConfig) -> Result<()> {
    if config.providers.backend != Backend::Cloud {
        return Ok(());
    }
    let identity = &config.identity;
    if identity.uses_static_token() {
        if identity.endpoints.is_empty() {
            return Err(Error::config(
                "identity.endpoints are required with a pre-issued token",
            ));
        }
        return Ok(());
    }
    if identity.auth_url.trim().is_empty() {
        return Err(Error::config(
            "identity.auth_url cannot be empty for the cloud backend",
        ));
    }
    identity.credentials().map(|_| ())
}

fn validate_http_config(config: &AppConfig) -> Result<()> {
    if config.http.timeout_secs == 0 {
        return Err(Error::config("HTTP timeout cannot be 0"));
    }
    if config.http.connect_timeout_secs == 0 {
        return Err(Error::config("HTTP connect timeout cannot be 0"));
    }
    if config.http.initial_backoff_ms > config.http.max_backoff_ms {
        return Err(Error::config(
            "HTTP initial backoff cannot exceed the maximum backoff",
        ));
    }
    Ok(())
}

fn validate_resilience_config(config: &AppConfig) -> Result<()> {
    if config.resilience.poll_interval_secs == 0 {
        return Err(Error::config("Poll interval cannot be 0"));
    }
    if config.resilience.poll_timeout_secs < config.resilience.poll_interval_secs {
        return Err(Error::config(
            "Poll timeout must be at least one poll interval",
        ));
    }
    Ok(())
}

fn validate_object_storage_config(config: &AppConfig) -> Result<()> {
    if config.object_storage.segment_size == 0 {
        return Err(Error::config("Object storage segment size cannot be 0"));
    }
    Ok(())
}

/// Configuration builder for programmatic configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider backend
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.config.providers.backend = backend;
        self
    }

    /// Set identity configuration
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityConfig) -> Self {
        self.config.identity = identity;
        self
    }

    /// Set the region
    #[must_use]
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.config.region = Some(region.into());
        self
    }

    /// Set logging configuration
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<AppConfig> {
        validate_app_config(&self.config)?;
        Ok(self.config)
    }
}
