//! Aggregate roots for the Sales Goals context.

use chrono::{DateTime, Utc};
use salesarena_core::aggregate::{AggregateRoot, AggregateState, Invariants};
use salesarena_core::clock::Clock;
use salesarena_core::error::DomainError;
use salesarena_core::id::UniqueId;
use salesarena_core::result::DomainResult;
use uuid::Uuid;

use super::events::{
    GoalAchieved, GoalCancelled, GoalCreated, GoalEvent, GoalEventKind, GoalRetargeted,
    ProgressRecorded,
};
use super::value_objects::{GoalPeriod, GoalStatus, GoalTarget, GoalTitle};

/// Broken invariant: an active goal whose progress already meets the target.
pub const ACTIVE_GOAL_REACHED: &str = "Ett aktivt mål kan inte ha nått sitt målvärde";
/// Broken invariant: an achieved goal below its target.
pub const ACHIEVED_BELOW_TARGET: &str = "Ett uppnått mål måste ha nått sitt målvärde";
/// Rejection for any change to a cancelled goal.
pub const GOAL_CANCELLED: &str = "Målet är avbrutet";

/// Everything needed to set a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    /// The organization the goal belongs to.
    pub organization_id: UniqueId,
    /// The seller working towards it.
    pub owner_id: UniqueId,
    /// What the goal is called.
    pub title: GoalTitle,
    /// Amount to reach.
    pub target: GoalTarget,
    /// When it runs.
    pub period: GoalPeriod,
}

/// State of a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalProps {
    /// The organization the goal belongs to.
    pub organization_id: UniqueId,
    /// The seller working towards it.
    pub owner_id: UniqueId,
    /// What the goal is called.
    pub title: GoalTitle,
    /// Amount to reach.
    pub target: GoalTarget,
    /// When it runs.
    pub period: GoalPeriod,
    /// Amount recorded so far.
    pub progress: u64,
    /// Lifecycle state.
    pub status: GoalStatus,
}

impl Invariants for GoalProps {
    fn check_invariants(&self) -> DomainResult<()> {
        let reached = self.target.is_reached_by(self.progress);
        match self.status {
            GoalStatus::Active if reached => Err(DomainError::invariant(ACTIVE_GOAL_REACHED)),
            GoalStatus::Achieved if !reached => Err(DomainError::invariant(ACHIEVED_BELOW_TARGET)),
            _ => Ok(()),
        }
    }
}

/// Aggregate root for a sales goal.
#[derive(Debug, Clone)]
pub struct Goal {
    state: AggregateState<GoalProps, GoalEvent>,
}

impl Goal {
    /// Sets a new, active goal with no progress.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` if the initial state is
    /// inconsistent.
    pub fn create(
        id: UniqueId,
        goal: NewGoal,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> DomainResult<Self> {
        let props = GoalProps {
            organization_id: goal.organization_id,
            owner_id: goal.owner_id,
            title: goal.title,
            target: goal.target,
            period: goal.period,
            progress: 0,
            status: GoalStatus::Active,
        };
        let state = AggregateState::create(id, props, |id, props| {
            GoalEvent::new(
                id,
                GoalEventKind::Created(GoalCreated {
                    organization_id: props.organization_id.clone(),
                    owner_id: props.owner_id.clone(),
                    title: props.title.to_string(),
                    target: props.target.amount(),
                    starts_at: props.period.starts_at(),
                    ends_at: props.period.ends_at(),
                }),
                correlation_id,
                clock,
            )
        })?;
        Ok(Self { state })
    }

    /// Rebuilds a persisted goal. Raises no events.
    #[must_use]
    pub fn restore(id: UniqueId, version: u64, props: GoalProps) -> Self {
        Self {
            state: AggregateState::restore(id, version, props),
        }
    }

    /// Adds `amount` made at `at`. Crossing the target marks the goal
    /// achieved in the same transition, so the progress and achievement
    /// events are committed together.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a zero amount or a time outside
    /// the period, and `DomainError::InvariantViolation` for a cancelled goal.
    pub fn record_progress(
        &mut self,
        amount: u64,
        at: DateTime<Utc>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> DomainResult<()> {
        let id = self.state.id().clone();
        self.state.transition_many(|draft| {
            if draft.status == GoalStatus::Cancelled {
                return Err(DomainError::invariant(GOAL_CANCELLED));
            }
            if amount == 0 {
                return Err(DomainError::validation("Framsteg måste vara större än 0"));
            }
            if !draft.period.contains(at) {
                return Err(DomainError::validation(
                    "Framsteg måste registreras inom målperioden",
                ));
            }

            draft.progress = draft.progress.saturating_add(amount);
            let mut events = vec![GoalEvent::new(
                &id,
                GoalEventKind::ProgressRecorded(ProgressRecorded {
                    amount,
                    total: draft.progress,
                    recorded_at: at,
                }),
                correlation_id,
                clock,
            )];
            if let Some(achieved) = achieve_if_reached(&id, draft, correlation_id, clock) {
                events.push(achieved);
            }
            Ok(events)
        })
    }

    /// Calls the goal off.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` unless the goal is active.
    pub fn cancel(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> DomainResult<()> {
        let id = self.state.id().clone();
        self.state.transition(|draft| {
            match draft.status {
                GoalStatus::Active => {}
                GoalStatus::Cancelled => return Err(DomainError::invariant(GOAL_CANCELLED)),
                GoalStatus::Achieved => {
                    return Err(DomainError::invariant("Ett uppnått mål kan inte avbrytas"));
                }
            }
            draft.status = GoalStatus::Cancelled;
            Ok(GoalEvent::new(
                &id,
                GoalEventKind::Cancelled(GoalCancelled {
                    progress: draft.progress,
                }),
                correlation_id,
                clock,
            ))
        })
    }

    /// Moves the target. A target at or below current progress achieves the
    /// goal immediately.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unchanged target and
    /// `DomainError::InvariantViolation` unless the goal is active.
    pub fn retarget(
        &mut self,
        target: GoalTarget,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> DomainResult<()> {
        let id = self.state.id().clone();
        self.state.transition_many(|draft| {
            if draft.status != GoalStatus::Active {
                return Err(DomainError::invariant(
                    "Endast aktiva mål kan få nytt målvärde",
                ));
            }
            if draft.target == target {
                return Err(DomainError::validation("Målvärdet är oförändrat"));
            }

            let previous = std::mem::replace(&mut draft.target, target);
            let mut events = vec![GoalEvent::new(
                &id,
                GoalEventKind::Retargeted(GoalRetargeted {
                    previous_target: previous.amount(),
                    target: draft.target.amount(),
                }),
                correlation_id,
                clock,
            )];
            if let Some(achieved) = achieve_if_reached(&id, draft, correlation_id, clock) {
                events.push(achieved);
            }
            Ok(events)
        })
    }

    /// The owning organization.
    #[must_use]
    pub fn organization_id(&self) -> &UniqueId {
        &self.state.props().organization_id
    }

    /// The seller working towards the goal.
    #[must_use]
    pub fn owner_id(&self) -> &UniqueId {
        &self.state.props().owner_id
    }

    /// The goal's title.
    #[must_use]
    pub fn title(&self) -> &GoalTitle {
        &self.state.props().title
    }

    /// Amount to reach.
    #[must_use]
    pub fn target(&self) -> &GoalTarget {
        &self.state.props().target
    }

    /// When the goal runs.
    #[must_use]
    pub fn period(&self) -> &GoalPeriod {
        &self.state.props().period
    }

    /// Amount recorded so far.
    #[must_use]
    pub fn progress(&self) -> u64 {
        self.state.props().progress
    }

    /// Amount still missing; zero once reached.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.target().amount().saturating_sub(self.progress())
    }

    /// Lifecycle state.
    #[must_use]
    pub fn status(&self) -> GoalStatus {
        self.state.props().status
    }

    /// The full props, for persistence adapters.
    #[must_use]
    pub fn props(&self) -> &GoalProps {
        self.state.props()
    }

    #[cfg(test)]
    pub(crate) fn props_mut_unchecked(&mut self) -> &mut GoalProps {
        self.state.props_mut_unchecked()
    }
}

fn achieve_if_reached(
    id: &UniqueId,
    draft: &mut GoalProps,
    correlation_id: Uuid,
    clock: &dyn Clock,
) -> Option<GoalEvent> {
    if draft.status != GoalStatus::Active || !draft.target.is_reached_by(draft.progress) {
        return None;
    }
    draft.status = GoalStatus::Achieved;
    Some(GoalEvent::new(
        id,
        GoalEventKind::Achieved(GoalAchieved {
            owner_id: draft.owner_id.clone(),
            total: draft.progress,
            target: draft.target.amount(),
        }),
        correlation_id,
        clock,
    ))
}

impl AggregateRoot for Goal {
    type Event = GoalEvent;
    const KIND: &'static str = "goal";

    fn id(&self) -> &UniqueId {
        self.state.id()
    }

    fn version(&self) -> u64 {
        self.state.version()
    }

    fn set_version(&mut self, version: u64) {
        self.state.set_version(version);
    }

    fn validate_invariants(&self) -> DomainResult<()> {
        self.state.validate_invariants()
    }

    fn pending_events(&self) -> &[GoalEvent] {
        self.state.pending_events()
    }

    fn pull_domain_events(&mut self) -> Vec<GoalEvent> {
        self.state.pull_domain_events()
    }
}
