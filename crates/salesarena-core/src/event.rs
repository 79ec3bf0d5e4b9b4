//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::id::UniqueId;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Event name, used for subscription routing.
    pub event_type: String,
    /// Aggregate this event belongs to.
    pub aggregate_id: UniqueId,
    /// Correlation ID for tracing a command through its effects.
    pub correlation_id: Uuid,
    /// Timestamp of the state transition.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Stamps metadata for an event raised now.
    #[must_use]
    pub fn new(
        event_type: &str,
        aggregate_id: &UniqueId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id: aggregate_id.clone(),
            correlation_id,
            occurred_at: clock.now(),
        }
    }
}

/// Trait that all domain events implement.
///
/// Events are immutable records: implementors expose no setters, and the
/// payload is a closed enum so handlers match exhaustively.
pub trait DomainEvent: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Returns the event name (used for subscription routing).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;

    /// When the transition happened.
    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata().occurred_at
    }

    /// The aggregate that raised this event.
    fn aggregate_id(&self) -> &UniqueId {
        &self.metadata().aggregate_id
    }
}
