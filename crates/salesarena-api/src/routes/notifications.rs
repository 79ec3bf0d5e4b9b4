//! Read-only view over the notification feed.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::notifications::Notification;
use crate::state::AppState;

/// Entries returned when no limit is given.
const DEFAULT_LIMIT: usize = 50;

/// Query string for GET /.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Maximum number of entries.
    pub limit: Option<usize>,
}

/// GET /?limit={n}
async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Json<Vec<Notification>> {
    Json(state.feed.recent(query.limit.unwrap_or(DEFAULT_LIMIT)))
}

/// Returns the router for the notification feed.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_notifications))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use salesarena_test_support::FixedClock;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_empty_feed_returns_empty_list() {
        let app = router().with_state(AppState::in_memory(Arc::new(FixedClock::default())));

        let response = app
            .oneshot(Request::builder().uri("/?limit=5").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"[]");
    }
}
