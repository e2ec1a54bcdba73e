//! Tests de middleware.

mod helpers;

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode, header},
};
use helpers::{assert_error_envelope, client};
use serde_json::{Value, json};
use uuid::Uuid;

// === Request ID ===

#[tokio::test]
async fn request_id_is_uuid_v4() {
    let response = client().get("/health").await;

    let id = response.header("x-request-id").unwrap();
    let parsed = Uuid::parse_str(id).unwrap();

    assert_eq!(parsed.get_version_num(), 4);
}

#[tokio::test]
async fn propagates_incoming_request_id() {
    let custom_id = "my-custom-request-id-12345";

    let response = client()
        .get_with_headers("/health", vec![("x-request-id", custom_id)])
        .await;

    response.assert_header("x-request-id", custom_id);
}

#[tokio::test]
async fn generates_different_ids_for_each_request() {
    let client = client();
    let response1 = client.get("/health").await;
    let response2 = client.get("/health").await;

    let id1 = response1.header("x-request-id").unwrap();
    let id2 = response2.header("x-request-id").unwrap();

    assert_ne!(id1, id2);
}

#[tokio::test]
async fn request_id_present_on_errors() {
    let client = client();

    client.get("/missing").await.assert_header_exists("x-request-id");
    client.get("/api/boom").await.assert_header_exists("x-request-id");
    client.get("/api/panic").await.assert_header_exists("x-request-id");
}

// === Cookies ===

#[tokio::test]
async fn cookies_are_decoded() {
    let response = client()
        .get_with_headers(
            "/api/cookies",
            vec![("cookie", "theme=dark; greeting=hello%20world; quoted=\"v\"")],
        )
        .await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(
        body,
        json!({"greeting": "hello world", "quoted": "v", "theme": "dark"})
    );
}

#[tokio::test]
async fn first_duplicate_cookie_wins() {
    let response = client()
        .get_with_headers("/api/cookies", vec![("cookie", "a=1; a=2")])
        .await;

    let body: Value = response.json();
    assert_eq!(body["a"], "1");
}

#[tokio::test]
async fn no_cookies_is_empty_map() {
    let response = client().get("/api/cookies").await;

    let body: Value = response.json();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn malformed_cookie_header_is_400() {
    let request = Request::builder()
        .uri("/api/cookies")
        .header(
            header::COOKIE,
            HeaderValue::from_bytes(b"a=\xff\xfe").unwrap(),
        )
        .body(Body::empty())
        .unwrap();

    let response = client().request(request).await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_error_envelope(&body);
    assert_eq!(body["statusCode"], 400);
}

// === Metrics ===

#[tokio::test]
async fn metrics_route_is_absent_without_exporter() {
    let response = client().get("/metrics").await;

    response.assert_status(StatusCode::NOT_FOUND);
}
