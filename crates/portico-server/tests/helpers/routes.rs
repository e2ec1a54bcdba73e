//! Route table used by the integration tests.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use portico_core::{ValidationError, ValidationErrorItem};
use portico_server::{
    AppError, StatusError,
    extract::{Json as EnvelopeJson, Path, Query},
    middleware::{Cookies, ParsedBody},
    routes::api_routes,
};
use serde::Deserialize;
use serde_json::Value;

/// Default routes plus handlers exercising each failure path.
pub fn test_routes() -> Router {
    api_routes()
        .route("/api/users", post(signup))
        .route("/api/echo", post(echo_parsed))
        .route("/api/echo-typed", post(echo_typed))
        .route("/api/cookies", get(list_cookies))
        .route("/api/boom", get(boom))
        .route("/api/anyhow", get(anyhow_failure))
        .route("/api/panic", get(panics))
        .route("/api/teapot", get(teapot))
        .route("/api/accounts", post(create_account))
        .route("/api/items/{id}", get(show_item))
        .route("/api/search", get(search))
        .route("/api/profile", post(save_profile))
}

#[derive(Debug, Deserialize)]
struct NewAccount {
    email: String,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    page: u32,
}

async fn signup() -> Result<Json<Value>, AppError> {
    Err(ValidationError::new(vec![
        ValidationErrorItem::new("email required").with_path("email"),
        ValidationErrorItem::new("password too short")
            .with_path("password")
            .with_kind("len"),
    ])
    .into())
}

async fn echo_parsed(body: ParsedBody) -> Json<Value> {
    Json(body.0)
}

async fn echo_typed(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn list_cookies(Cookies(cookies): Cookies) -> Json<BTreeMap<String, String>> {
    Json(
        cookies
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

async fn boom() -> Result<&'static str, AppError> {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
    Err(AppError::unhandled_with_cause("database unavailable", io))
}

async fn anyhow_failure() -> Result<&'static str, AppError> {
    Err(anyhow::anyhow!("upstream timed out").into())
}

async fn panics() -> &'static str {
    panic!("kaboom")
}

async fn teapot() -> Result<&'static str, AppError> {
    Err(StatusError::new(StatusCode::IM_A_TEAPOT, "Short and stout")
        .with_title("Teapot")
        .with_errors(["Short and stout"])
        .into())
}

async fn create_account(EnvelopeJson(account): EnvelopeJson<NewAccount>) -> EnvelopeJson<Value> {
    EnvelopeJson(serde_json::json!({ "email": account.email }))
}

async fn show_item(Path(id): Path<u32>) -> Json<Value> {
    Json(serde_json::json!({ "id": id }))
}

async fn search(Query(params): Query<SearchParams>) -> Json<Value> {
    Json(serde_json::json!({ "page": params.page }))
}

/// Data layer reached through `anyhow`, as service code usually is.
async fn store_profile() -> anyhow::Result<()> {
    Err(ValidationError::from_messages(["email required"]).into())
}

async fn save_profile() -> Result<&'static str, AppError> {
    store_profile().await?;
    Ok("saved")
}
