//! Structured logging with tracing
//!
//! Configures the global subscriber: human-readable or JSON output on
//! stdout, plus an optional daily-rolling file.

use crate::constants::{DEFAULT_LOG_FILE_PREFIX, LOG_FILTER_ENV};
use crate::error_ext::ErrorContext;
use rcs_domain::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;

pub use crate::config::LoggingConfig;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with the provided configuration
///
/// `RCS_LOG` takes precedence over `config.level` when it holds a valid
/// filter directive.
///
/// # Errors
///
/// Fails on an unknown level or when a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new(".")),
            path.file_stem()
                .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE_PREFIX)),
        )
    });

    // json and text layers have different types, hence the separate branches
    let registry = Registry::default().with(filter);
    let installed = if config.json_format {
        let stdout = fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).try_init()
        } else {
            registry.with(stdout).try_init()
        }
    } else {
        let stdout = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).try_init()
        } else {
            registry.with(stdout).try_init()
        }
    };
    installed.config_context("Failed to install the global tracing subscriber")?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::config(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Log configuration loading status
pub fn log_config_loaded(config_path: &Path, success: bool) {
    if success {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!("Configuration file not found: {}", config_path.display());
    }
}
