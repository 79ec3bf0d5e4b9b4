//! Integration tests for the goal endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

fn goal_body(organization_id: &str, owner_id: &str, target: u64) -> Value {
    json!({
        "organization_id": organization_id,
        "owner_id": owner_id,
        "title": "Q1 försäljning",
        "target": target,
        "starts_at": "2026-01-01T00:00:00Z",
        "ends_at": "2026-04-01T00:00:00Z",
    })
}

async fn create_goal(state: &salesarena_api::state::AppState, target: u64) -> String {
    let (status, json) = common::post_json(
        common::build_test_app(state.clone()),
        "/api/v1/goals",
        &goal_body("org-1", "anna", target),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["aggregate_id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_progress_accumulates_until_achieved() {
    // Arrange
    let state = common::test_state();
    let goal_id = create_goal(&state, 100).await;
    let progress_uri = format!("/api/v1/goals/{goal_id}/progress");

    // Act
    let (first, first_json) = common::post_json(
        common::build_test_app(state.clone()),
        &progress_uri,
        &json!({ "amount": 40 }),
    )
    .await;
    let (second, second_json) = common::post_json(
        common::build_test_app(state.clone()),
        &progress_uri,
        &json!({ "amount": 60, "recorded_at": "2026-02-01T12:00:00Z" }),
    )
    .await;

    // Assert
    assert_eq!(first, StatusCode::OK);
    assert_eq!(first_json["status"], "active");
    assert_eq!(second, StatusCode::OK);
    assert_eq!(second_json["status"], "achieved");

    let (_, view) = common::get_json(
        common::build_test_app(state),
        &format!("/api/v1/goals/{goal_id}"),
    )
    .await;
    assert_eq!(view["progress"], 100);
    assert_eq!(view["remaining"], 0);
    assert_eq!(view["percent_complete"], 100);
    assert_eq!(view["version"], 3);
}

#[tokio::test]
async fn test_progress_outside_period_returns_400() {
    let state = common::test_state();
    let goal_id = create_goal(&state, 100).await;

    let (status, json) = common::post_json(
        common::build_test_app(state),
        &format!("/api/v1/goals/{goal_id}/progress"),
        &json!({ "amount": 10, "recorded_at": "2026-05-01T00:00:00Z" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Framsteg måste registreras inom målperioden");
}

#[tokio::test]
async fn test_cancelled_goal_rejects_progress() {
    // Arrange
    let state = common::test_state();
    let goal_id = create_goal(&state, 100).await;
    let (cancelled, json) = common::post_json(
        common::build_test_app(state.clone()),
        &format!("/api/v1/goals/{goal_id}/cancel"),
        &json!({}),
    )
    .await;
    assert_eq!(cancelled, StatusCode::OK);
    assert_eq!(json["status"], "cancelled");

    // Act
    let (status, json) = common::post_json(
        common::build_test_app(state),
        &format!("/api/v1/goals/{goal_id}/progress"),
        &json!({ "amount": 10 }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "Målet är avbrutet");
}

#[tokio::test]
async fn test_retarget_below_progress_achieves_goal() {
    let state = common::test_state();
    let goal_id = create_goal(&state, 100).await;
    common::post_json(
        common::build_test_app(state.clone()),
        &format!("/api/v1/goals/{goal_id}/progress"),
        &json!({ "amount": 50 }),
    )
    .await;

    let (status, json) = common::post_json(
        common::build_test_app(state),
        &format!("/api/v1/goals/{goal_id}/retarget"),
        &json!({ "target": 40 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "achieved");
    assert_eq!(json["event_ids"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_goals_for_organization() {
    let state = common::test_state();
    create_goal(&state, 100).await;
    create_goal(&state, 200).await;
    common::post_json(
        common::build_test_app(state.clone()),
        "/api/v1/goals",
        &goal_body("org-2", "bo", 50),
    )
    .await;

    let (status, json) =
        common::get_json(common::build_test_app(state), "/api/v1/goals?organization=org-1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_achievement_shows_up_in_notification_feed() {
    let state = common::test_state();
    let goal_id = create_goal(&state, 10).await;
    common::post_json(
        common::build_test_app(state.clone()),
        &format!("/api/v1/goals/{goal_id}/progress"),
        &json!({ "amount": 10 }),
    )
    .await;

    let (status, feed) =
        common::get_json(common::build_test_app(state), "/api/v1/notifications").await;

    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = feed
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["goal.achieved", "goal.progress_recorded", "goal.created"]);
}

#[tokio::test]
async fn test_blank_organization_filter_returns_400() {
    let app = common::build_test_app(common::test_state());

    let (status, json) = common::get_json(app, "/api/v1/goals?organization=").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}
