//! Route modules organized by bounded context.

use axum::http::HeaderMap;
use uuid::Uuid;

pub mod goals;
pub mod health;
pub mod notifications;
pub mod organizations;

/// Header carrying a caller-supplied correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// The request's correlation id, or a fresh one when the header is absent
/// or not a UUID.
pub(crate) fn correlation_id(headers: &HeaderMap) -> Uuid {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .unwrap_or_else(Uuid::new_v4)
}
