//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use salesarena_api::state::AppState;
use salesarena_test_support::FixedClock;
use tower::ServiceExt;

/// Fresh in-memory state on the fixed test clock (2026-01-15 10:00 UTC).
pub fn test_state() -> AppState {
    AppState::in_memory(Arc::new(FixedClock::default()))
}

/// Build the full app router over `state`, exactly as the server does.
pub fn build_test_app(state: AppState) -> Router {
    salesarena_api::app(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the response.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Creates an organization owned by `owner` and returns its id.
pub async fn create_organization(state: &AppState, name: &str, owner: &str, seats: u32) -> String {
    let (status, json) = post_json(
        build_test_app(state.clone()),
        "/api/v1/organizations",
        &serde_json::json!({ "name": name, "owner_id": owner, "seat_limit": seats }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["aggregate_id"].as_str().unwrap().to_owned()
}
