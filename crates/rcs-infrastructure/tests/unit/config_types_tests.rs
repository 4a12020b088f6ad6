//! Configuration section tests

use rcs_infrastructure::config::{Backend, HttpConfig, IdentityConfig, ResilienceConfig};
use rcs_infrastructure::constants::DEFAULT_IDENTITY_URL;
use rcs_providers::Credentials;
use std::time::Duration;

#[test]
fn test_api_key_preferred_over_password() {
    let identity = IdentityConfig {
        username: Some("demo".to_string()),
        api_key: Some("key".to_string()),
        password: Some("pass".to_string()),
        ..IdentityConfig::default()
    };
    assert!(matches!(
        identity.credentials().unwrap(),
        Credentials::ApiKey { ref api_key, .. } if api_key == "key"
    ));
}

#[test]
fn test_password_credentials_carry_tenant() {
    let identity = IdentityConfig {
        username: Some("demo".to_string()),
        api_key: Some("  ".to_string()),
        password: Some("pass".to_string()),
        tenant_name: Some("acme".to_string()),
        ..IdentityConfig::default()
    };
    match identity.credentials().unwrap() {
        Credentials::Password { tenant_name, .. } => {
            assert_eq!(tenant_name.as_deref(), Some("acme"));
        }
        other => panic!("expected password credentials, got {other:?}"),
    }
}

#[test]
fn test_missing_username_rejected() {
    let identity = IdentityConfig {
        api_key: Some("key".to_string()),
        ..IdentityConfig::default()
    };
    assert!(identity.credentials().is_err());
    assert_eq!(identity.auth_url, DEFAULT_IDENTITY_URL);
}

#[test]
fn test_debug_redacts_secrets() {
    let identity = IdentityConfig {
        username: Some("demo".to_string()),
        api_key: Some("very-secret".to_string()),
        token: Some("tok-secret".to_string()),
        ..IdentityConfig::default()
    };
    let rendered = format!("{identity:?}");
    assert!(rendered.contains("demo"));
    assert!(!rendered.contains("very-secret"));
    assert!(!rendered.contains("tok-secret"));
}

#[test]
fn test_http_config_maps_to_client_config() {
    let http = HttpConfig {
        timeout_secs: 12,
        max_retries: 0,
        initial_backoff_ms: 10,
        max_backoff_ms: 40,
        user_agent: Some("ops-tool/1.0".to_string()),
        ..HttpConfig::default()
    };
    let client = http.client_config();
    assert_eq!(client.timeout, Duration::from_secs(12));
    assert_eq!(client.user_agent, "ops-tool/1.0");
    assert_eq!(client.retry.max_retries, 0);
    assert_eq!(client.retry.backoff(5), Duration::from_millis(40));

    let default_agent = HttpConfig::default().client_config().user_agent;
    assert!(default_agent.starts_with("rcs/"));
}

#[test]
fn test_resilience_poll_options() {
    let options = ResilienceConfig {
        poll_interval_secs: 2,
        poll_timeout_secs: 30,
    }
    .poll_options();
    assert_eq!(options.interval, Duration::from_secs(2));
    assert_eq!(options.timeout, Duration::from_secs(30));
}

#[test]
fn test_backend_names() {
    assert_eq!(Backend::default(), Backend::InMemory);
    assert_eq!(Backend::Cloud.to_string(), "cloud");
    assert_eq!(Backend::InMemory.to_string(), "in_memory");
    let parsed: Backend = serde_json::from_str("\"in_memory\"").unwrap();
    assert_eq!(parsed, Backend::InMemory);
}
