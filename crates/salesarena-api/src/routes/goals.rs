//! Routes for the Sales Goals bounded context.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use salesarena_core::command::require;
use salesarena_core::id::UniqueId;
use salesarena_core::use_case::UseCase;
use salesarena_goals::application::query_handlers::{self, GoalView};
use salesarena_goals::application::use_cases::{
    CancelGoalUseCase, CreateGoalUseCase, GoalCommandResult, RecordProgressUseCase,
    RetargetGoalUseCase,
};
use salesarena_goals::domain::commands;
use salesarena_goals::domain::value_objects::GoalStatus;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::correlation_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    /// The organization the goal belongs to.
    pub organization_id: String,
    /// The seller working towards it.
    pub owner_id: String,
    /// Title.
    pub title: String,
    /// Amount to reach.
    pub target: u64,
    /// Period start.
    pub starts_at: DateTime<Utc>,
    /// Period end, exclusive.
    pub ends_at: DateTime<Utc>,
}

/// Request body for POST /{id}/progress.
#[derive(Debug, Deserialize)]
pub struct RecordProgressRequest {
    /// Amount made.
    pub amount: u64,
    /// When it was made; the server clock when absent.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Request body for POST /{id}/retarget.
#[derive(Debug, Deserialize)]
pub struct RetargetRequest {
    /// The new target.
    pub target: u64,
}

/// Query string for GET /.
#[derive(Debug, Deserialize)]
pub struct OrganizationQuery {
    /// Organization whose goals to list.
    pub organization: String,
}

/// Response body returned after a goal command.
#[derive(Debug, Serialize)]
pub struct GoalCommandResponse {
    /// The goal affected or created.
    pub aggregate_id: UniqueId,
    /// Version after the command.
    pub version: u64,
    /// Status after the command.
    pub status: GoalStatus,
    /// IDs of the domain events published.
    pub event_ids: Vec<Uuid>,
}

impl From<GoalCommandResult> for GoalCommandResponse {
    fn from(result: GoalCommandResult) -> Self {
        Self {
            aggregate_id: result.goal_id,
            version: result.version,
            status: result.status,
            event_ids: result.event_ids,
        }
    }
}

/// POST /
#[instrument(skip(state, headers, request))]
async fn create_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<GoalCommandResponse>), ApiError> {
    let command = commands::CreateGoal {
        correlation_id: correlation_id(&headers),
        organization_id: request.organization_id,
        owner_id: request.owner_id,
        title: request.title,
        target: request.target,
        starts_at: request.starts_at,
        ends_at: request.ends_at,
    };

    let result = CreateGoalUseCase::new(state.goal_services.clone())
        .execute(command)
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
) -> Result<Json<GoalView>, ApiError> {
    let view = query_handlers::get_goal_by_id(
        &UniqueId::new(goal_id),
        state.goal_services.repository.as_ref(),
    )
    .await?;
    Ok(Json(view))
}

/// GET /?organization={organization_id}
#[instrument(skip(state))]
async fn list_goals(
    State(state): State<AppState>,
    Query(query): Query<OrganizationQuery>,
) -> Result<Json<Vec<GoalView>>, ApiError> {
    require("organization", &query.organization)?;
    let views = query_handlers::list_goals_for_organization(
        &UniqueId::new(query.organization),
        state.goals.as_ref(),
    )
    .await?;
    Ok(Json(views))
}

/// POST /{id}/progress
#[instrument(skip(state, headers, request))]
async fn record_progress(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<RecordProgressRequest>,
) -> Result<Json<GoalCommandResponse>, ApiError> {
    let command = commands::RecordProgress {
        correlation_id: correlation_id(&headers),
        goal_id,
        amount: request.amount,
        recorded_at: request.recorded_at,
    };

    let result = RecordProgressUseCase::new(state.goal_services.clone())
        .execute(command)
        .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/cancel
#[instrument(skip(state, headers))]
async fn cancel_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<GoalCommandResponse>, ApiError> {
    let command = commands::CancelGoal {
        correlation_id: correlation_id(&headers),
        goal_id,
    };

    let result = CancelGoalUseCase::new(state.goal_services.clone())
        .execute(command)
        .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/retarget
#[instrument(skip(state, headers, request))]
async fn retarget_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<RetargetRequest>,
) -> Result<Json<GoalCommandResponse>, ApiError> {
    let command = commands::RetargetGoal {
        correlation_id: correlation_id(&headers),
        goal_id,
        target: request.target,
    };

    let result = RetargetGoalUseCase::new(state.goal_services.clone())
        .execute(command)
        .await?;

    Ok(Json(result.into()))
}

/// Returns the router for the goals context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_goal).get(list_goals))
        .route("/{id}", get(get_goal))
        .route("/{id}/progress", post(record_progress))
        .route("/{id}/cancel", post(cancel_goal))
        .route("/{id}/retarget", post(retarget_goal))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use salesarena_test_support::FixedClock;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn json_of(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    fn new_goal(target: u64) -> Value {
        serde_json::json!({
            "organization_id": "org-1",
            "owner_id": "anna",
            "title": "Q1 försäljning",
            "target": target,
            "starts_at": "2026-01-01T00:00:00Z",
            "ends_at": "2026-04-01T00:00:00Z",
        })
    }

    #[tokio::test]
    async fn test_progress_past_target_achieves_goal() {
        // Arrange
        let state = AppState::in_memory(Arc::new(FixedClock::default()));
        let created = router()
            .with_state(state.clone())
            .oneshot(post("/", &new_goal(100)))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let goal_id = json_of(created).await["aggregate_id"]
            .as_str()
            .unwrap()
            .to_owned();

        // Act
        let response = router()
            .with_state(state)
            .oneshot(post(
                &format!("/{goal_id}/progress"),
                &serde_json::json!({ "amount": 120 }),
            ))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["status"], "achieved");
        assert_eq!(json["version"], 2);
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_target_returns_400() {
        let app = router().with_state(AppState::in_memory(Arc::new(FixedClock::default())));

        let response = app.oneshot(post("/", &new_goal(0))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_of(response).await["message"],
            "Målvärde måste vara större än 0"
        );
    }

    #[tokio::test]
    async fn test_blank_organization_filter_returns_400() {
        let app = router().with_state(AppState::in_memory(Arc::new(FixedClock::default())));
        let request = Request::builder()
            .uri("/?organization=")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["message"], "organization krävs");
    }

    #[tokio::test]
    async fn test_cancel_unknown_goal_returns_404() {
        let app = router().with_state(AppState::in_memory(Arc::new(FixedClock::default())));
        let request = Request::builder()
            .method("POST")
            .uri("/ghost/cancel")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
