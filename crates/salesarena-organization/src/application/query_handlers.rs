//! Query handlers for the Organization & Membership context.
//!
//! Queries load aggregates and return read-only view DTOs. They never raise
//! events or save.

use chrono::{DateTime, Utc};
use salesarena_core::aggregate::AggregateRoot;
use salesarena_core::id::UniqueId;
use salesarena_core::repository::Repository;
use salesarena_core::result::{DomainResult, LogErr};
use serde::Serialize;

use crate::domain::aggregates::Organization;
use crate::domain::value_objects::MemberRole;
use crate::infrastructure::OrganizationRepository;

/// Read-only view of one membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    /// The member's user id.
    pub user_id: UniqueId,
    /// Their role.
    pub role: MemberRole,
    /// When they joined.
    pub joined_at: DateTime<Utc>,
}

/// Read-only view of an organization aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationView {
    /// The organization identifier.
    pub organization_id: UniqueId,
    /// Display name.
    pub name: String,
    /// Paid seats.
    pub seat_limit: u32,
    /// Seats not yet taken.
    pub seats_available: u32,
    /// Members in join order.
    pub members: Vec<MemberView>,
    /// Stored version.
    pub version: u64,
}

impl From<&Organization> for OrganizationView {
    fn from(organization: &Organization) -> Self {
        let seat_limit = organization.seat_limit().seats();
        let taken = u32::try_from(organization.members().len()).unwrap_or(u32::MAX);
        Self {
            organization_id: organization.id().clone(),
            name: organization.name().to_string(),
            seat_limit,
            seats_available: seat_limit.saturating_sub(taken),
            members: organization
                .members()
                .iter()
                .map(|member| MemberView {
                    user_id: member.user_id.clone(),
                    role: member.role,
                    joined_at: member.joined_at,
                })
                .collect(),
            version: organization.version(),
        }
    }
}

/// Retrieves an organization by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no organization has the id.
pub async fn get_organization_by_id(
    organization_id: &UniqueId,
    repo: &dyn Repository<Organization>,
) -> DomainResult<OrganizationView> {
    let organization = repo
        .find_by_id(organization_id)
        .await
        .log_err("organization.get")?;
    Ok(OrganizationView::from(&organization))
}

/// Lists the organizations `user_id` is a member of.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn list_organizations_for_member(
    user_id: &UniqueId,
    repo: &dyn OrganizationRepository,
) -> DomainResult<Vec<OrganizationView>> {
    let organizations = repo
        .find_by_member(user_id)
        .await
        .log_err("organization.list_for_member")?;
    Ok(organizations.iter().map(OrganizationView::from).collect())
}
