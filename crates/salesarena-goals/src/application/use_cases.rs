//! Use cases for the Sales Goals context.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use salesarena_core::aggregate::AggregateRoot;
use salesarena_core::clock::{Clock, SharedClock};
use salesarena_core::dispatcher::EventDispatcher;
use salesarena_core::id::UniqueId;
use salesarena_core::repository::Repository;
use salesarena_core::result::DomainResult;
use salesarena_core::use_case::UseCase;
use tracing::warn;
use uuid::Uuid;

use crate::domain::aggregates::{Goal, NewGoal};
use crate::domain::commands::{CancelGoal, CreateGoal, RecordProgress, RetargetGoal};
use crate::domain::events::GoalEvent;
use crate::domain::value_objects::{GoalPeriod, GoalStatus, GoalTarget, GoalTitle};

/// Result of a successfully handled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalCommandResult {
    /// The goal affected or created by the command.
    pub goal_id: UniqueId,
    /// The version stored by this command.
    pub version: u64,
    /// Status after the command.
    pub status: GoalStatus,
    /// Ids of the events published, in order.
    pub event_ids: Vec<Uuid>,
}

/// Collaborators shared by every goal use case.
#[derive(Clone)]
pub struct GoalServices {
    /// Where goals are loaded from and saved to.
    pub repository: Arc<dyn Repository<Goal>>,
    /// Publishes events after a successful save.
    pub dispatcher: EventDispatcher<GoalEvent>,
    /// Stamps events and defaults progress times.
    pub clock: SharedClock,
}

impl fmt::Debug for GoalServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoalServices")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl GoalServices {
    /// Bundles the collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<dyn Repository<Goal>>,
        dispatcher: EventDispatcher<GoalEvent>,
        clock: SharedClock,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
        }
    }

    async fn modify<F>(&self, goal_id: &str, change: F) -> DomainResult<GoalCommandResult>
    where
        F: FnOnce(&mut Goal, &dyn Clock) -> DomainResult<()> + Send,
    {
        let mut goal = self.repository.find_by_id(&UniqueId::new(goal_id)).await?;
        change(&mut goal, self.clock.as_ref())?;
        self.commit(goal).await
    }

    async fn commit(&self, mut goal: Goal) -> DomainResult<GoalCommandResult> {
        let report = self
            .dispatcher
            .persist_and_dispatch(self.repository.as_ref(), &mut goal)
            .await?;
        if report.failure_count() > 0 {
            warn!(
                goal_id = %goal.id(),
                failures = report.failure_count(),
                "event handlers failed after save"
            );
        }
        Ok(GoalCommandResult {
            goal_id: goal.id().clone(),
            version: goal.version(),
            status: goal.status(),
            event_ids: report.event_ids,
        })
    }
}

/// Sets a new goal.
#[derive(Debug, Clone)]
pub struct CreateGoalUseCase {
    services: GoalServices,
}

impl CreateGoalUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: GoalServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for CreateGoalUseCase {
    type Input = CreateGoal;
    type Output = GoalCommandResult;

    async fn handle(&self, input: CreateGoal) -> DomainResult<GoalCommandResult> {
        let new_goal = NewGoal {
            organization_id: UniqueId::new(input.organization_id),
            owner_id: UniqueId::new(input.owner_id),
            title: GoalTitle::create(&input.title)?,
            target: GoalTarget::create(input.target)?,
            period: GoalPeriod::create(input.starts_at, input.ends_at)?,
        };
        let goal = Goal::create(
            UniqueId::generate(),
            new_goal,
            input.correlation_id,
            self.services.clock.as_ref(),
        )?;
        self.services.commit(goal).await
    }
}

/// Records progress against a goal.
#[derive(Debug, Clone)]
pub struct RecordProgressUseCase {
    services: GoalServices,
}

impl RecordProgressUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: GoalServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for RecordProgressUseCase {
    type Input = RecordProgress;
    type Output = GoalCommandResult;

    async fn handle(&self, input: RecordProgress) -> DomainResult<GoalCommandResult> {
        let RecordProgress {
            correlation_id,
            goal_id,
            amount,
            recorded_at,
        } = input;
        self.services
            .modify(&goal_id, move |goal, clock| {
                let at = recorded_at.unwrap_or_else(|| clock.now());
                goal.record_progress(amount, at, correlation_id, clock)
            })
            .await
    }
}

/// Cancels a goal.
#[derive(Debug, Clone)]
pub struct CancelGoalUseCase {
    services: GoalServices,
}

impl CancelGoalUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: GoalServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for CancelGoalUseCase {
    type Input = CancelGoal;
    type Output = GoalCommandResult;

    async fn handle(&self, input: CancelGoal) -> DomainResult<GoalCommandResult> {
        let correlation_id = input.correlation_id;
        self.services
            .modify(&input.goal_id, move |goal, clock| {
                goal.cancel(correlation_id, clock)
            })
            .await
    }
}

/// Moves a goal's target.
#[derive(Debug, Clone)]
pub struct RetargetGoalUseCase {
    services: GoalServices,
}

impl RetargetGoalUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: GoalServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for RetargetGoalUseCase {
    type Input = RetargetGoal;
    type Output = GoalCommandResult;

    async fn handle(&self, input: RetargetGoal) -> DomainResult<GoalCommandResult> {
        let target = GoalTarget::create(input.target)?;
        let correlation_id = input.correlation_id;
        self.services
            .modify(&input.goal_id, move |goal, clock| {
                goal.retarget(target, correlation_id, clock)
            })
            .await
    }
}
