//! Persistence adapters for the Sales Goals context.

use async_trait::async_trait;
use salesarena_core::id::UniqueId;
use salesarena_core::repository::Repository;
use salesarena_core::result::DomainResult;
use salesarena_store::InMemoryRepository;

use crate::domain::aggregates::Goal;

/// Goal persistence with the per-organization listing the read side needs.
#[async_trait]
pub trait GoalRepository: Repository<Goal> {
    /// Every goal of `organization_id`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the backing store fails.
    async fn find_by_organization(&self, organization_id: &UniqueId) -> DomainResult<Vec<Goal>>;
}

#[async_trait]
impl GoalRepository for InMemoryRepository<Goal> {
    async fn find_by_organization(&self, organization_id: &UniqueId) -> DomainResult<Vec<Goal>> {
        Ok(self.find_where(|goal| goal.organization_id() == organization_id))
    }
}
