//! Domain events for the Sales Goals context.

use chrono::{DateTime, Utc};
use salesarena_core::clock::Clock;
use salesarena_core::event::{DomainEvent, EventMetadata};
use salesarena_core::id::UniqueId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted when a goal is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalCreated {
    /// The organization the goal belongs to.
    pub organization_id: UniqueId,
    /// The seller working towards it.
    pub owner_id: UniqueId,
    /// The goal's title.
    pub title: String,
    /// Amount to reach.
    pub target: u64,
    /// Period start.
    pub starts_at: DateTime<Utc>,
    /// Period end, exclusive.
    pub ends_at: DateTime<Utc>,
}

/// Emitted for every progress entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecorded {
    /// Amount added by this entry.
    pub amount: u64,
    /// Running total after the entry.
    pub total: u64,
    /// When the progress was made.
    pub recorded_at: DateTime<Utc>,
}

/// Emitted when progress first reaches the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalAchieved {
    /// The owner who reached it.
    pub owner_id: UniqueId,
    /// Progress at the moment of achievement.
    pub total: u64,
    /// The target that was reached.
    pub target: u64,
}

/// Emitted when a goal is called off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalCancelled {
    /// Progress when cancelled.
    pub progress: u64,
}

/// Emitted when the target amount changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRetargeted {
    /// Target before the change.
    pub previous_target: u64,
    /// Target after the change.
    pub target: u64,
}

/// Event type identifier for [`GoalCreated`].
pub const GOAL_CREATED_EVENT_TYPE: &str = "goal.created";

/// Event type identifier for [`ProgressRecorded`].
pub const PROGRESS_RECORDED_EVENT_TYPE: &str = "goal.progress_recorded";

/// Event type identifier for [`GoalAchieved`].
pub const GOAL_ACHIEVED_EVENT_TYPE: &str = "goal.achieved";

/// Event type identifier for [`GoalCancelled`].
pub const GOAL_CANCELLED_EVENT_TYPE: &str = "goal.cancelled";

/// Event type identifier for [`GoalRetargeted`].
pub const GOAL_RETARGETED_EVENT_TYPE: &str = "goal.retargeted";

/// Event payload variants for the Sales Goals context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GoalEventKind {
    /// A goal was set.
    Created(GoalCreated),
    /// Progress was recorded.
    ProgressRecorded(ProgressRecorded),
    /// The target was reached.
    Achieved(GoalAchieved),
    /// The goal was cancelled.
    Cancelled(GoalCancelled),
    /// The target changed.
    Retargeted(GoalRetargeted),
}

/// Domain event envelope for the Sales Goals context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: GoalEventKind,
}

impl GoalEvent {
    /// Stamps `kind` with fresh metadata for `goal_id`.
    #[must_use]
    pub fn new(
        goal_id: &UniqueId,
        kind: GoalEventKind,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        let metadata = EventMetadata::new(kind.event_type(), goal_id, correlation_id, clock);
        Self { metadata, kind }
    }
}

impl GoalEventKind {
    fn event_type(&self) -> &'static str {
        match self {
            Self::Created(_) => GOAL_CREATED_EVENT_TYPE,
            Self::ProgressRecorded(_) => PROGRESS_RECORDED_EVENT_TYPE,
            Self::Achieved(_) => GOAL_ACHIEVED_EVENT_TYPE,
            Self::Cancelled(_) => GOAL_CANCELLED_EVENT_TYPE,
            Self::Retargeted(_) => GOAL_RETARGETED_EVENT_TYPE,
        }
    }
}

impl DomainEvent for GoalEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
