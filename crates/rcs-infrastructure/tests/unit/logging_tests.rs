//! Logging Tests

use rcs_infrastructure::constants::DEFAULT_LOG_LEVEL;
use rcs_infrastructure::logging::{LoggingConfig, init_logging, parse_log_level};
use tracing::Level;

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
    assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);
    assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);

    assert!(parse_log_level("invalid").is_err());
}

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, DEFAULT_LOG_LEVEL);
    assert!(!config.json_format);
    assert!(config.file_output.is_none());
}

#[test]
fn test_init_rejects_unknown_level() {
    let config = LoggingConfig {
        level: "chatty".to_string(),
        ..LoggingConfig::default()
    };
    assert!(init_logging(&config).is_err());
}

// the only test in this binary that installs a global subscriber
#[test]
fn test_init_installs_subscriber_once() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = LoggingConfig {
        level: "debug".to_string(),
        json_format: true,
        file_output: Some(dir.path().join("rcs.log")),
    };

    init_logging(&config).unwrap();
    tracing::debug!(container = "logs", "written through the json layers");

    // a second global subscriber is refused
    assert!(init_logging(&config).is_err());
}
