//! Tests del parser de bodies JSON.

mod helpers;

use axum::{
    body::Body,
    http::{Method, StatusCode},
};
use helpers::{assert_error_envelope, client, error_messages};
use serde_json::{Value, json};

#[tokio::test]
async fn parsed_body_reaches_handler() {
    let response = client()
        .post_json_with_csrf("/api/echo", r#"{"name":"portico","tags":["a","b"]}"#)
        .await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body, json!({"name": "portico", "tags": ["a", "b"]}));
}

#[tokio::test]
async fn raw_body_is_still_readable_by_json_extractor() {
    let response = client()
        .post_json_with_csrf("/api/echo-typed", r#"[1,2,3]"#)
        .await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body, json!([1, 2, 3]));
}

#[tokio::test]
async fn empty_json_body_is_empty_object() {
    let response = client().post_json_with_csrf("/api/echo", "").await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let response = client()
        .post_json("/api/echo", r#"{"name": "#, vec![])
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_error_envelope(&body);
    assert_eq!(body["statusCode"], 400);
    assert!(error_messages(&body).is_empty());
}

#[tokio::test]
async fn scalar_top_level_is_rejected() {
    let response = client().post_json("/api/echo", "\"just a string\"", vec![]).await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["message"], "Unexpected token \" in JSON at position 0");
}

#[tokio::test]
async fn body_over_limit_is_413() {
    let payload = json!({ "blob": "x".repeat(2048) }).to_string();

    let response = client().post_json("/api/echo", &payload, vec![]).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = response.json();
    assert_error_envelope(&body);
    assert_eq!(body["statusCode"], 413);
}

#[tokio::test]
async fn declared_length_over_limit_is_413() {
    let response = client()
        .post_json("/api/echo", "{}", vec![("content-length", "4096")])
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn non_utf8_charset_is_415() {
    let response = client()
        .send(
            Method::POST,
            "/api/echo",
            vec![("content-type", "application/json; charset=latin1")],
            Body::from("{}"),
        )
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let body: Value = response.json();
    assert_error_envelope(&body);
    assert_eq!(body["statusCode"], 415);
}

#[tokio::test]
async fn non_json_content_type_is_not_parsed() {
    let client = client();
    let session = client.csrf_session().await;

    let response = client
        .send(
            Method::POST,
            "/api/echo",
            vec![
                ("content-type", "text/plain"),
                ("cookie", session.cookie.as_str()),
                ("x-csrf-token", session.token.as_str()),
            ],
            Body::from("{not json"),
        )
        .await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body, json!({}));
}
