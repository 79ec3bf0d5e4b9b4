//! SalesArena HTTP API.

pub mod config;
pub mod error;
pub mod notifications;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full router over `state`.
pub fn app(state: AppState) -> Router {
    // TODO: restrict CORS origins once the web client has a fixed host.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/organizations", routes::organizations::router())
        .nest("/api/v1/goals", routes::goals::router())
        .nest("/api/v1/notifications", routes::notifications::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
