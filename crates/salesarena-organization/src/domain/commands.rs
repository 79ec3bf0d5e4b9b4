//! Commands for the Organization & Membership context.

use salesarena_core::command::{Command, require};
use salesarena_core::result::DomainResult;
use uuid::Uuid;

use super::value_objects::MemberRole;

/// Command to found a new organization.
#[derive(Debug, Clone)]
pub struct CreateOrganization {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Display name, validated by the use case.
    pub name: String,
    /// The founding owner's user id.
    pub owner_id: String,
    /// Seats bought with the subscription.
    pub seat_limit: u32,
}

impl Command for CreateOrganization {
    fn command_type(&self) -> &'static str {
        "organization.create"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("ownerId", &self.owner_id)
    }
}

/// Command to rename an organization.
#[derive(Debug, Clone)]
pub struct RenameOrganization {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The organization to rename.
    pub organization_id: String,
    /// The new name.
    pub name: String,
}

impl Command for RenameOrganization {
    fn command_type(&self) -> &'static str {
        "organization.rename"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("organizationId", &self.organization_id)
    }
}

/// Command to add a member.
#[derive(Debug, Clone)]
pub struct AddMember {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The organization to join.
    pub organization_id: String,
    /// The joining user.
    pub user_id: String,
    /// The role they get.
    pub role: MemberRole,
}

impl Command for AddMember {
    fn command_type(&self) -> &'static str {
        "organization.add_member"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("organizationId", &self.organization_id)?;
        require("userId", &self.user_id)
    }
}

/// Command to remove a member.
#[derive(Debug, Clone)]
pub struct RemoveMember {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The organization.
    pub organization_id: String,
    /// The member to remove.
    pub user_id: String,
}

impl Command for RemoveMember {
    fn command_type(&self) -> &'static str {
        "organization.remove_member"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("organizationId", &self.organization_id)?;
        require("userId", &self.user_id)
    }
}

/// Command to change a member's role.
#[derive(Debug, Clone)]
pub struct ChangeMemberRole {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The organization.
    pub organization_id: String,
    /// The member.
    pub user_id: String,
    /// The new role.
    pub role: MemberRole,
}

impl Command for ChangeMemberRole {
    fn command_type(&self) -> &'static str {
        "organization.change_member_role"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("organizationId", &self.organization_id)?;
        require("userId", &self.user_id)
    }
}

/// Command to change the seat limit.
#[derive(Debug, Clone)]
pub struct ChangeSeatLimit {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The organization.
    pub organization_id: String,
    /// The new seat count.
    pub seat_limit: u32,
}

impl Command for ChangeSeatLimit {
    fn command_type(&self) -> &'static str {
        "organization.change_seat_limit"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> DomainResult<()> {
        require("organizationId", &self.organization_id)
    }
}
