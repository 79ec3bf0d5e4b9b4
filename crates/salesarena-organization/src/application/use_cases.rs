//! Use cases for the Organization & Membership context.
//!
//! Each use case loads the organization, applies one transition, and hands
//! the aggregate to the dispatcher, which saves it and then publishes the
//! events it raised.

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

use crate::domain::aggregates::Organization;
use crate::domain::commands::{
    AddMember, ChangeMemberRole, ChangeSeatLimit, CreateOrganization, RemoveMember,
    RenameOrganization,
};
use crate::domain::events::OrganizationEvent;
use crate::domain::value_objects::{OrganizationName, SeatLimit};

/// Result of a successfully handled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationCommandResult {
    /// The organization affected or created by the command.
    pub organization_id: UniqueId,
    /// The version stored by this command.
    pub version: u64,
    /// Ids of the events published, in order.
    pub event_ids: Vec<Uuid>,
}

/// Collaborators shared by every organization use case.
#[derive(Clone)]
pub struct OrganizationServices {
    /// Where organizations are loaded from and saved to.
    pub repository: Arc<dyn Repository<Organization>>,
    /// Publishes events after a successful save.
    pub dispatcher: EventDispatcher<OrganizationEvent>,
    /// Stamps event and membership times.
    pub clock: SharedClock,
}

impl fmt::Debug for OrganizationServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrganizationServices")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl OrganizationServices {
    /// Bundles the collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<dyn Repository<Organization>>,
        dispatcher: EventDispatcher<OrganizationEvent>,
        clock: SharedClock,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
        }
    }

    async fn modify<F>(
        &self,
        organization_id: &str,
        change: F,
    ) -> DomainResult<OrganizationCommandResult>
    where
        F: FnOnce(&mut Organization, &dyn Clock) -> DomainResult<()> + Send,
    {
        let id = UniqueId::new(organization_id);
        let mut organization = self.repository.find_by_id(&id).await?;
        change(&mut organization, self.clock.as_ref())?;
        self.commit(organization).await
    }

    async fn commit(
        &self,
        mut organization: Organization,
    ) -> DomainResult<OrganizationCommandResult> {
        let report = self
            .dispatcher
            .persist_and_dispatch(self.repository.as_ref(), &mut organization)
            .await?;
        if report.failure_count() > 0 {
            warn!(
                organization_id = %organization.id(),
                failures = report.failure_count(),
                "event handlers failed after save"
            );
        }
        Ok(OrganizationCommandResult {
            organization_id: organization.id().clone(),
            version: organization.version(),
            event_ids: report.event_ids,
        })
    }
}

/// Founds an organization.
#[derive(Debug, Clone)]
pub struct CreateOrganizationUseCase {
    services: OrganizationServices,
}

impl CreateOrganizationUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: OrganizationServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for CreateOrganizationUseCase {
    type Input = CreateOrganization;
    type Output = OrganizationCommandResult;

    async fn handle(&self, input: CreateOrganization) -> DomainResult<OrganizationCommandResult> {
        let name = OrganizationName::create(&input.name)?;
        let seat_limit = SeatLimit::create(input.seat_limit)?;
        let organization = Organization::create(
            UniqueId::generate(),
            name,
            UniqueId::new(input.owner_id),
            seat_limit,
            input.correlation_id,
            self.services.clock.as_ref(),
        )?;
        self.services.commit(organization).await
    }
}

/// Renames an organization.
#[derive(Debug, Clone)]
pub struct RenameOrganizationUseCase {
    services: OrganizationServices,
}

impl RenameOrganizationUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: OrganizationServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for RenameOrganizationUseCase {
    type Input = RenameOrganization;
    type Output = OrganizationCommandResult;

    async fn handle(&self, input: RenameOrganization) -> DomainResult<OrganizationCommandResult> {
        let name = OrganizationName::create(&input.name)?;
        let correlation_id = input.correlation_id;
        self.services
            .modify(&input.organization_id, move |organization, clock| {
                organization.rename(name, correlation_id, clock)
            })
            .await
    }
}

/// Adds a member to an organization.
#[derive(Debug, Clone)]
pub struct AddMemberUseCase {
    services: OrganizationServices,
}

impl AddMemberUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: OrganizationServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for AddMemberUseCase {
    type Input = AddMember;
    type Output = OrganizationCommandResult;

    async fn handle(&self, input: AddMember) -> DomainResult<OrganizationCommandResult> {
        let AddMember {
            correlation_id,
            organization_id,
            user_id,
            role,
        } = input;
        self.services
            .modify(&organization_id, move |organization, clock| {
                organization.add_member(UniqueId::new(user_id), role, correlation_id, clock)
            })
            .await
    }
}

/// Removes a member from an organization.
#[derive(Debug, Clone)]
pub struct RemoveMemberUseCase {
    services: OrganizationServices,
}

impl RemoveMemberUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: OrganizationServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for RemoveMemberUseCase {
    type Input = RemoveMember;
    type Output = OrganizationCommandResult;

    async fn handle(&self, input: RemoveMember) -> DomainResult<OrganizationCommandResult> {
        let user_id = UniqueId::new(input.user_id);
        let correlation_id = input.correlation_id;
        self.services
            .modify(&input.organization_id, move |organization, clock| {
                organization.remove_member(&user_id, correlation_id, clock)
            })
            .await
    }
}

/// Changes a member's role.
#[derive(Debug, Clone)]
pub struct ChangeMemberRoleUseCase {
    services: OrganizationServices,
}

impl ChangeMemberRoleUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: OrganizationServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for ChangeMemberRoleUseCase {
    type Input = ChangeMemberRole;
    type Output = OrganizationCommandResult;

    async fn handle(&self, input: ChangeMemberRole) -> DomainResult<OrganizationCommandResult> {
        let user_id = UniqueId::new(input.user_id);
        let (role, correlation_id) = (input.role, input.correlation_id);
        self.services
            .modify(&input.organization_id, move |organization, clock| {
                organization.change_member_role(&user_id, role, correlation_id, clock)
            })
            .await
    }
}

/// Changes an organization's seat limit.
#[derive(Debug, Clone)]
pub struct ChangeSeatLimitUseCase {
    services: OrganizationServices,
}

impl ChangeSeatLimitUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(services: OrganizationServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl UseCase for ChangeSeatLimitUseCase {
    type Input = ChangeSeatLimit;
    type Output = OrganizationCommandResult;

    async fn handle(&self, input: ChangeSeatLimit) -> DomainResult<OrganizationCommandResult> {
        let seat_limit = SeatLimit::create(input.seat_limit)?;
        let correlation_id = input.correlation_id;
        self.services
            .modify(&input.organization_id, move |organization, clock| {
                organization.change_seat_limit(seat_limit, correlation_id, clock)
            })
            .await
    }
}
