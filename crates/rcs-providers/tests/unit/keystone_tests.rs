//! Identity v2.0 provider tests

use chrono::{Duration, Utc};
use rcs_domain::error::Error;
use rcs_domain::ports::IdentityProvider;
use rcs_providers::identity::{Credentials, KeystoneIdentityProvider};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_utils::fast_config;

fn token_response(expires_in: Duration) -> Value {
    json!({
        "access": {
            "token": {
                "id": "issued-token",
                "expires": (Utc::now() + expires_in).to_rfc3339(),
                "tenant": {"id": "123456", "name": "123456"}
            },
            "serviceCatalog": [
                {
                    "name": "cloudFiles",
                    "type": "object-store",
                    "endpoints": [
                        {
                            "region": "DFW",
                            "tenantId": "MossoCloudFS_abc",
                            "publicURL": "https://storage.dfw.example.com/v1/MossoCloudFS_abc",
                            "internalURL": "https://snet-storage.dfw.example.com/v1/MossoCloudFS_abc"
                        },
                        {
                            "region": "ORD",
                            "tenantId": "MossoCloudFS_abc",
                            "publicURL": "https://storage.ord.example.com/v1/MossoCloudFS_abc"
                        }
                    ]
                },
                {
                    "name": "cloudMonitoring",
                    "type": "rax:monitor",
                    "endpoints": [
                        {"tenantId": "123456", "publicURL": "https://monitoring.example.com/v1.0/123456/"}
                    ]
                }
            ],
            "user": {"id": "1", "name": "demo", "RAX-AUTH:defaultRegion": "ORD"}
        }
    })
}

fn api_key() -> Credentials {
    Credentials::ApiKey {
        username: "demo".to_string(),
        api_key: "secret".to_string(),
    }
}

async fn identity_server(expires_in: Duration, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens"))
        .and(body_partial_json(json!({
            "auth": {"RAX-KSKEY:apiKeyCredentials": {"username": "demo", "apiKey": "secret"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response(expires_in)))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_token_is_cached_until_near_expiry() {
    let server = identity_server(Duration::hours(24), 1).await;
    let identity =
        KeystoneIdentityProvider::new(format!("{}/v2.0/", server.uri()), api_key(), &fast_config())
            .unwrap();

    let first = identity.token().await.unwrap();
    let second = identity.token().await.unwrap();
    assert_eq!(first.id, "issued-token");
    assert_eq!(first, second);
    assert_eq!(first.tenant.unwrap().id, "123456");
}

#[tokio::test]
async fn test_token_inside_refresh_margin_is_renewed() {
    let server = identity_server(Duration::minutes(2), 2).await;
    let identity =
        KeystoneIdentityProvider::new(format!("{}/v2.0", server.uri()), api_key(), &fast_config())
            .unwrap();

    identity.token().await.unwrap();
    identity.token().await.unwrap();
}

#[tokio::test]
async fn test_invalidate_forces_reauthentication() {
    let server = identity_server(Duration::hours(24), 2).await;
    let identity =
        KeystoneIdentityProvider::new(format!("{}/v2.0", server.uri()), api_key(), &fast_config())
            .unwrap();

    identity.token().await.unwrap();
    identity.invalidate().await;
    identity.token().await.unwrap();
}

#[tokio::test]
async fn test_endpoint_resolution_uses_region_then_default_region() {
    let server = identity_server(Duration::hours(24), 1).await;
    let identity =
        KeystoneIdentityProvider::new(format!("{}/v2.0", server.uri()), api_key(), &fast_config())
            .unwrap();

    assert_eq!(
        identity.endpoint("object-store", Some("dfw"), false).await.unwrap(),
        "https://storage.dfw.example.com/v1/MossoCloudFS_abc"
    );
    assert_eq!(
        identity.endpoint("object-store", Some("DFW"), true).await.unwrap(),
        "https://snet-storage.dfw.example.com/v1/MossoCloudFS_abc"
    );
    // user's default region is ORD, which has no internal URL
    assert_eq!(
        identity.endpoint("object-store", None, true).await.unwrap(),
        "https://storage.ord.example.com/v1/MossoCloudFS_abc"
    );
    assert_eq!(
        identity.endpoint("rax:monitor", Some("LON"), false).await.unwrap(),
        "https://monitoring.example.com/v1.0/123456"
    );
    assert!(
        identity
            .endpoint("rax:autoscale", None, false)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_configured_default_region_overrides_identity() {
    let server = identity_server(Duration::hours(24), 1).await;
    let identity =
        KeystoneIdentityProvider::new(format!("{}/v2.0", server.uri()), api_key(), &fast_config())
            .unwrap()
            .with_default_region("DFW");

    let access = identity.authenticate().await.unwrap();
    assert_eq!(access.default_region.as_deref(), Some("DFW"));
    assert_eq!(
        identity.endpoint("object-store", None, false).await.unwrap(),
        "https://storage.dfw.example.com/v1/MossoCloudFS_abc"
    );
}

#[tokio::test]
async fn test_rejected_credentials_are_authentication_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "unauthorized": {"code": 401, "message": "Username or api key is invalid."}
        })))
        .mount(&server)
        .await;

    let credentials = Credentials::Password {
        username: "demo".to_string(),
        password: "wrong".to_string(),
        tenant_name: Some("123456".to_string()),
    };
    let identity =
        KeystoneIdentityProvider::new(format!("{}/v2.0", server.uri()), credentials, &fast_config())
            .unwrap();

    match identity.token().await.unwrap_err() {
        Error::Authentication { message, .. } => {
            assert!(message.contains("Username or api key is invalid."));
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[test]
fn test_credentials_debug_redacts_secrets() {
    let rendered = format!("{:?}", api_key());
    assert!(rendered.contains("demo"));
    assert!(!rendered.contains("secret"));
}
