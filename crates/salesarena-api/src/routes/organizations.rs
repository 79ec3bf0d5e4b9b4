//! Routes for the Organization & Membership bounded context.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use salesarena_core::command::require;
use salesarena_core::id::UniqueId;
use salesarena_core::use_case::UseCase;
use salesarena_organization::application::query_handlers::{
    self, OrganizationView,
};
use salesarena_organization::application::use_cases::{
    AddMemberUseCase, ChangeMemberRoleUseCase, ChangeSeatLimitUseCase, CreateOrganizationUseCase,
    OrganizationCommandResult, RemoveMemberUseCase, RenameOrganizationUseCase,
};
use salesarena_organization::domain::commands;
use salesarena_organization::domain::value_objects::MemberRole;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::correlation_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    /// Display name.
    pub name: String,
    /// The founding owner.
    pub owner_id: String,
    /// Seats bought with the subscription.
    pub seat_limit: u32,
}

/// Request body for POST /{id}/rename.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    /// The new name.
    pub name: String,
}

/// Request body for POST /{id}/members.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// The joining user.
    pub user_id: String,
    /// Their role.
    pub role: MemberRole,
}

/// Request body for POST /{id}/members/{user_id}/role.
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    /// The new role.
    pub role: MemberRole,
}

/// Request body for POST /{id}/seat-limit.
#[derive(Debug, Deserialize)]
pub struct SeatLimitRequest {
    /// The new seat count.
    pub seat_limit: u32,
}

/// Query string for GET /.
#[derive(Debug, Deserialize)]
pub struct MemberQuery {
    /// User whose organizations to list.
    pub member: String,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The organization affected or created.
    pub aggregate_id: UniqueId,
    /// Version after the command.
    pub version: u64,
    /// IDs of the domain events published.
    pub event_ids: Vec<Uuid>,
}

impl From<OrganizationCommandResult> for CommandResponse {
    fn from(result: OrganizationCommandResult) -> Self {
        Self {
            aggregate_id: result.organization_id,
            version: result.version,
            event_ids: result.event_ids,
        }
    }
}

/// POST /
#[instrument(skip(state, headers, request))]
async fn create_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let command = commands::CreateOrganization {
        correlation_id: correlation_id(&headers),
        name: request.name,
        owner_id: request.owner_id,
        seat_limit: request.seat_limit,
    };

    let result = CreateOrganizationUseCase::new(state.organization_services.clone())
        .execute(command)
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_organization(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
) -> Result<Json<OrganizationView>, ApiError> {
    let view = query_handlers::get_organization_by_id(
        &UniqueId::new(organization_id),
        state.organization_services.repository.as_ref(),
    )
    .await?;
    Ok(Json(view))
}

/// GET /?member={user_id}
#[instrument(skip(state))]
async fn list_organizations(
    State(state): State<AppState>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<Vec<OrganizationView>>, ApiError> {
    require("member", &query.member)?;
    let views = query_handlers::list_organizations_for_member(
        &UniqueId::new(query.member),
        state.organizations.as_ref(),
    )
    .await?;
    Ok(Json(views))
}

/// POST /{id}/rename
#[instrument(skip(state, headers, request))]
async fn rename_organization(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<RenameRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RenameOrganization {
        correlation_id: correlation_id(&headers),
        organization_id,
        name: request.name,
    };

    let result = RenameOrganizationUseCase::new(state.organization_services.clone())
        .execute(command)
        .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/members
#[instrument(skip(state, headers, request))]
async fn add_member(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AddMember {
        correlation_id: correlation_id(&headers),
        organization_id,
        user_id: request.user_id,
        role: request.role,
    };

    let result = AddMemberUseCase::new(state.organization_services.clone())
        .execute(command)
        .await?;

    Ok(Json(result.into()))
}

/// DELETE /{id}/members/{user_id}
#[instrument(skip(state, headers))]
async fn remove_member(
    State(state): State<AppState>,
    Path((organization_id, user_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RemoveMember {
        correlation_id: correlation_id(&headers),
        organization_id,
        user_id,
    };

    let result = RemoveMemberUseCase::new(state.organization_services.clone())
        .execute(command)
        .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/members/{user_id}/role
#[instrument(skip(state, headers, request))]
async fn change_member_role(
    State(state): State<AppState>,
    Path((organization_id, user_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ChangeMemberRole {
        correlation_id: correlation_id(&headers),
        organization_id,
        user_id,
        role: request.role,
    };

    let result = ChangeMemberRoleUseCase::new(state.organization_services.clone())
        .execute(command)
        .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/seat-limit
#[instrument(skip(state, headers, request))]
async fn change_seat_limit(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SeatLimitRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ChangeSeatLimit {
        correlation_id: correlation_id(&headers),
        organization_id,
        seat_limit: request.seat_limit,
    };

    let result = ChangeSeatLimitUseCase::new(state.organization_services.clone())
        .execute(command)
        .await?;

    Ok(Json(result.into()))
}

/// Returns the router for the organization context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_organization).get(list_organizations))
        .route("/{id}", get(get_organization))
        .route("/{id}/rename", post(rename_organization))
        .route("/{id}/members", post(add_member))
        .route("/{id}/members/{user_id}", delete(remove_member))
        .route("/{id}/members/{user_id}/role", post(change_member_role))
        .route("/{id}/seat-limit", post(change_seat_limit))
}
