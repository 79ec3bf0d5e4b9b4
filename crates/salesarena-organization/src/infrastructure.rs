//! Persistence adapters for the Organization & Membership context.

use async_trait::async_trait;
use salesarena_core::id::UniqueId;
use salesarena_core::repository::Repository;
use salesarena_core::result::DomainResult;
use salesarena_store::InMemoryRepository;

use crate::domain::aggregates::Organization;

/// Organization persistence with the membership lookup the read side needs.
#[async_trait]
pub trait OrganizationRepository: Repository<Organization> {
    /// Every organization `user_id` belongs to, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the backing store fails.
    async fn find_by_member(&self, user_id: &UniqueId) -> DomainResult<Vec<Organization>>;
}

#[async_trait]
impl OrganizationRepository for InMemoryRepository<Organization> {
    async fn find_by_member(&self, user_id: &UniqueId) -> DomainResult<Vec<Organization>> {
        Ok(self.find_where(|organization| organization.is_member(user_id)))
    }
}
