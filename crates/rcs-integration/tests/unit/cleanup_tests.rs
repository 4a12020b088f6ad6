//! Cleanup routines against a Cloud Files endpoint without a CDN service

use std::sync::Arc;
use std::time::Duration;

use rcs_integration::cleanup::{self, object_storage::cleanup_containers};
use rcs_providers::{CloudFilesProvider, HttpClientConfig, RestClient, StaticIdentityProvider};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "/v1/acct";

fn storage_without_cdn(server: &MockServer) -> CloudFilesProvider {
    let client = RestClient::new(
        "object_storage",
        &format!("{}{BASE}", server.uri()),
        Arc::new(StaticIdentityProvider::new("token")),
        &HttpClientConfig::with_timeout(Duration::from_secs(5)),
    )
    .unwrap();
    CloudFilesProvider::new(client, None)
}

async fn mount_account(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "keep-me", "count": 1, "bytes": 3},
            {"name": "rcs-it-container-abc", "count": 0, "bytes": 0}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/rcs-it-container-abc")))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_containers_deleted_without_cdn_endpoint() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    Mock::given(method("DELETE"))
        .and(path(format!("{BASE}/rcs-it-container-abc")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let storage = storage_without_cdn(&server);
    cleanup_containers(&storage, "rcs-it").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let deleted: Vec<_> = requests
        .iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(deleted, vec![format!("{BASE}/rcs-it-container-abc")]);
}

#[tokio::test]
async fn test_failed_listing_is_not_reported_as_cleaned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BASE))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = storage_without_cdn(&server);
    let err = cleanup::run_all([cleanup::boxed(cleanup_containers(&storage, "rcs-it"))])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_container_gone_mid_cleanup_counts_as_removed() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    Mock::given(method("DELETE"))
        .and(path(format!("{BASE}/rcs-it-container-abc")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = storage_without_cdn(&server);
    let outcome = cleanup::run_all([cleanup::boxed(cleanup_containers(&storage, "rcs-it"))]).await;
    assert!(outcome.is_ok());
}
