//! Commands for the Sales Goals context.

use chrono::{DateTime, Utc};
use salesarena_core::command::{Command, require};
use salesarena_core::result::DomainResult;
use uuid::Uuid;

/// Command to set a new goal.
#[derive(Debug, Clone)]
pub struct CreateGoal {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The organization the goal belongs to.
    pub organization_id: String,
    /// The seller working towards it.
    pub owner_id: String,
    /// Title, validated by the use case.
    pub title: String,
    /// Amount to reach.
    pub target: u64,
    /// Period start.
    pub starts_at: DateTime<Utc>,
    /// Period end, exclusive.
    pub ends_at: DateTime<Utc>,
}

impl Command for CreateGoal {
    fn command_type(&self) -> &'static str {
        "goal.create"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("organizationId", &self.organization_id)?;
        require("ownerId", &self.owner_id)
    }
}

/// Command to record progress against a goal.
#[derive(Debug, Clone)]
pub struct RecordProgress {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The goal.
    pub goal_id: String,
    /// Amount made.
    pub amount: u64,
    /// When it was made; defaults to now.
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Command for RecordProgress {
    fn command_type(&self) -> &'static str {
        "goal.record_progress"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("goalId", &self.goal_id)
    }
}

/// Command to cancel a goal.
#[derive(Debug, Clone)]
pub struct CancelGoal {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The goal.
    pub goal_id: String,
}

impl Command for CancelGoal {
    fn command_type(&self) -> &'static str {
        "goal.cancel"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("goalId", &self.goal_id)
    }
}

/// Command to move a goal's target.
#[derive(Debug, Clone)]
pub struct RetargetGoal {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The goal.
    pub goal_id: String,
    /// The new target amount.
    pub target: u64,
}

impl Command for RetargetGoal {
    fn command_type(&self) -> &'static str {
        "goal.retarget"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("goalId", &self.goal_id)
    }
}
