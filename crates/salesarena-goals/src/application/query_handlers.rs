//! Query handlers for the Sales Goals context.

use chrono::{DateTime, Utc};
use salesarena_core::aggregate::AggregateRoot;
use salesarena_core::id::UniqueId;
use salesarena_core::repository::Repository;
use salesarena_core::result::{DomainResult, LogErr};
use serde::Serialize;

use crate::domain::aggregates::Goal;
use crate::domain::value_objects::GoalStatus;
use crate::infrastructure::GoalRepository;

/// Read-only view of a goal aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalView {
    /// The goal identifier.
    pub goal_id: UniqueId,
    /// The owning organization.
    pub organization_id: UniqueId,
    /// The seller working towards it.
    pub owner_id: UniqueId,
    /// Title.
    pub title: String,
    /// Amount to reach.
    pub target: u64,
    /// Amount recorded so far.
    pub progress: u64,
    /// Amount still missing.
    pub remaining: u64,
    /// Progress as a whole percentage, capped at 100.
    pub percent_complete: u8,
    /// Lifecycle state.
    pub status: GoalStatus,
    /// Period start.
    pub starts_at: DateTime<Utc>,
    /// Period end, exclusive.
    pub ends_at: DateTime<Utc>,
    /// Stored version.
    pub version: u64,
}

fn percent_complete(progress: u64, target: u64) -> u8 {
    if target == 0 {
        return 100;
    }
    let percent = u128::from(progress) * 100 / u128::from(target);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

impl From<&Goal> for GoalView {
    fn from(goal: &Goal) -> Self {
        Self {
            goal_id: goal.id().clone(),
            organization_id: goal.organization_id().clone(),
            owner_id: goal.owner_id().clone(),
            title: goal.title().to_string(),
            target: goal.target().amount(),
            progress: goal.progress(),
            remaining: goal.remaining(),
            percent_complete: percent_complete(goal.progress(), goal.target().amount()),
            status: goal.status(),
            starts_at: goal.period().starts_at(),
            ends_at: goal.period().ends_at(),
            version: goal.version(),
        }
    }
}

/// Retrieves a goal by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no goal has the id.
pub async fn get_goal_by_id(goal_id: &UniqueId, repo: &dyn Repository<Goal>) -> DomainResult<GoalView> {
    let goal = repo.find_by_id(goal_id).await.log_err("goal.get")?;
    Ok(GoalView::from(&goal))
}

/// Lists every goal of an organization.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn list_goals_for_organization(
    organization_id: &UniqueId,
    repo: &dyn GoalRepository,
) -> DomainResult<Vec<GoalView>> {
    let goals = repo
        .find_by_organization(organization_id)
        .await
        .log_err("goal.list_for_organization")?;
    Ok(goals.iter().map(GoalView::from).collect())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use salesarena_core::error::DomainError;
    use salesarena_store::InMemoryRepository;
    use salesarena_test_support::{FixedClock, fixed_now};
    use uuid::Uuid;

    use super::*;
    use crate::domain::aggregates::NewGoal;
    use crate::domain::value_objects::{GoalPeriod, GoalTarget, GoalTitle};

    fn goal(id: &str, organization: &str, target: u64) -> Goal {
        Goal::create(
            UniqueId::new(id),
            NewGoal {
                organization_id: UniqueId::new(organization),
                owner_id: UniqueId::new("anna"),
                title: GoalTitle::create("Demos booked").unwrap(),
                target: GoalTarget::create(target).unwrap(),
                period: GoalPeriod::create(fixed_now(), fixed_now() + Duration::days(30))
                    .unwrap(),
            },
            Uuid::nil(),
            &FixedClock::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_goal_by_id_reports_progress() {
        // Arrange
        let repo = InMemoryRepository::new();
        let mut demos = goal("goal-1", "org-1", 8);
        demos
            .record_progress(3, fixed_now(), Uuid::nil(), &FixedClock::default())
            .unwrap();
        repo.save(&demos).await.unwrap();

        // Act
        let view = get_goal_by_id(&UniqueId::new("goal-1"), &repo).await.unwrap();

        // Assert
        assert_eq!(view.progress, 3);
        assert_eq!(view.remaining, 5);
        assert_eq!(view.percent_complete, 37);
        assert_eq!(view.status, GoalStatus::Active);
        assert_eq!(view.version, 1);
    }

    #[tokio::test]
    async fn test_get_goal_by_id_returns_not_found() {
        let repo: InMemoryRepository<Goal> = InMemoryRepository::new();

        let result = get_goal_by_id(&UniqueId::new("ghost"), &repo).await;

        assert_eq!(
            result,
            Err(DomainError::not_found("goal", &UniqueId::new("ghost")))
        );
    }

    #[tokio::test]
    async fn test_list_goals_for_organization_filters_by_organization() {
        let repo = InMemoryRepository::new();
        repo.save(&goal("goal-2", "org-1", 5)).await.unwrap();
        repo.save(&goal("goal-1", "org-1", 5)).await.unwrap();
        repo.save(&goal("goal-3", "org-2", 5)).await.unwrap();

        let views = list_goals_for_organization(&UniqueId::new("org-1"), &repo)
            .await
            .unwrap();

        let ids: Vec<&str> = views.iter().map(|view| view.goal_id.as_str()).collect();
        assert_eq!(ids, vec!["goal-1", "goal-2"]);
    }

    #[test]
    fn test_percent_complete_is_capped() {
        assert_eq!(percent_complete(0, 4), 0);
        assert_eq!(percent_complete(1, 3), 33);
        assert_eq!(percent_complete(9, 4), 100);
    }
}
