//! REST client tests: URL building, status mapping, retries and re-authentication

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use rcs_domain::error::Error;
use rcs_providers::http::RestRequest;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_utils::{CountingIdentity, TEST_TOKEN, client_for, client_with_identity};

#[tokio::test]
async fn test_segments_are_percent_encoded_and_token_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/acct/my%20container/dir/file%3F.txt"))
        .and(header("X-Auth-Token", TEST_TOKEN))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "/v1/acct");
    let request = RestRequest::get(["my container"])
        .path("dir/file?.txt")
        .query("format", "json");
    let body: serde_json::Value = client.send_json(request).await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_status_codes_map_to_domain_errors() {
    let server = MockServer::start().await;
    let cases = [
        ("missing", ResponseTemplate::new(404)),
        (
            "bad",
            ResponseTemplate::new(400).set_body_json(json!({"message": "name too long", "code": 400})),
        ),
        (
            "busy",
            ResponseTemplate::new(422)
                .set_body_json(json!({"message": "Load Balancer is immutable", "code": 422})),
        ),
        (
            "slow",
            ResponseTemplate::new(413)
                .insert_header("Retry-After", "7")
                .set_body_json(json!({"overLimit": {"message": "rate limit", "code": 413}})),
        ),
        ("broken", ResponseTemplate::new(500).set_body_string("boom")),
        ("denied", ResponseTemplate::new(403).set_body_string("forbidden")),
    ];
    for (name, response) in cases {
        Mock::given(method("POST"))
            .and(path(format!("/{name}")))
            .respond_with(response)
            .mount(&server)
            .await;
    }
    let client = client_for(&server, "");

    let err = client.send(RestRequest::post(["missing"])).await.unwrap_err();
    assert!(err.is_not_found());

    match client.send(RestRequest::post(["bad"])).await.unwrap_err() {
        Error::InvalidArgument { message } => assert_eq!(message, "name too long"),
        other => panic!("expected InvalidArgument, got {other:?}"),
    }

    let err = client.send(RestRequest::post(["busy"])).await.unwrap_err();
    assert!(err.is_conflict());

    match client.send(RestRequest::post(["slow"])).await.unwrap_err() {
        Error::RateLimited {
            message,
            retry_after,
        } => {
            assert_eq!(message, "rate limit");
            assert_eq!(retry_after, Some(Duration::from_secs(7)));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }

    match client.send(RestRequest::post(["broken"])).await.unwrap_err() {
        Error::Service { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Service, got {other:?}"),
    }

    assert!(matches!(
        client.send(RestRequest::post(["denied"])).await.unwrap_err(),
        Error::Authentication { .. }
    ));
}

#[tokio::test]
async fn test_idempotent_request_retried_after_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 1})))
        .mount(&server)
        .await;

    let client = client_for(&server, "");
    let value: u32 = client
        .send_field(RestRequest::get(["flaky"]), "value")
        .await
        .unwrap();
    assert_eq!(value, 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_post_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "");
    let err = client.send(RestRequest::post(["flaky"])).await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_retries_give_up_after_policy_limit() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, "");
    let err = client.send(RestRequest::delete(["down"])).await.unwrap_err();
    assert!(matches!(err, Error::Service { status: 502, .. }));
}

#[tokio::test]
async fn test_unauthorized_invalidates_token_and_retries_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/secure"))
        .and(header("X-Auth-Token", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/secure"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let identity = Arc::new(CountingIdentity::default());
    let client = client_with_identity(&server, "", identity.clone());
    client.send_empty(RestRequest::post(["secure"])).await.unwrap();
    assert_eq!(identity.invalidations.load(Ordering::SeqCst), 1);
    assert_eq!(identity.tokens.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_second_unauthorized_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secure"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, "");
    let err = client.send(RestRequest::get(["secure"])).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test]
async fn test_created_id_read_from_location() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/entities"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", format!("{}/entities/enAAAA/", server.uri())),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "");
    let response = client.send(RestRequest::post(["entities"])).await.unwrap();
    assert_eq!(response.created_id().as_deref(), Some("enAAAA"));
}
