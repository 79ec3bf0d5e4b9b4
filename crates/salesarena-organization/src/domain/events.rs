//! Domain events for the Organization & Membership context.

use salesarena_core::clock::Clock;
use salesarena_core::event::{DomainEvent, EventMetadata};
use salesarena_core::id::UniqueId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::MemberRole;

/// Emitted when an organization is founded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationCreated {
    /// The organization's name.
    pub name: String,
    /// The founding owner.
    pub owner_id: UniqueId,
    /// Seats bought with the subscription.
    pub seat_limit: u32,
}

/// Emitted when an organization changes its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRenamed {
    /// Name before the change.
    pub previous_name: String,
    /// Name after the change.
    pub name: String,
}

/// Emitted when a user joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAdded {
    /// The new member.
    pub user_id: UniqueId,
    /// Their role.
    pub role: MemberRole,
}

/// Emitted when a user leaves or is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRemoved {
    /// The removed member.
    pub user_id: UniqueId,
}

/// Emitted when a member's role changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRoleChanged {
    /// The member.
    pub user_id: UniqueId,
    /// Role before the change.
    pub previous_role: MemberRole,
    /// Role after the change.
    pub role: MemberRole,
}

/// Emitted when the subscription's seat count changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatLimitChanged {
    /// Seats before the change.
    pub previous_seats: u32,
    /// Seats after the change.
    pub seats: u32,
}

/// Event type identifier for [`OrganizationCreated`].
pub const ORGANIZATION_CREATED_EVENT_TYPE: &str = "organization.created";

/// Event type identifier for [`OrganizationRenamed`].
pub const ORGANIZATION_RENAMED_EVENT_TYPE: &str = "organization.renamed";

/// Event type identifier for [`MemberAdded`].
pub const MEMBER_ADDED_EVENT_TYPE: &str = "organization.member_added";

/// Event type identifier for [`MemberRemoved`].
pub const MEMBER_REMOVED_EVENT_TYPE: &str = "organization.member_removed";

/// Event type identifier for [`MemberRoleChanged`].
pub const MEMBER_ROLE_CHANGED_EVENT_TYPE: &str = "organization.member_role_changed";

/// Event type identifier for [`SeatLimitChanged`].
pub const SEAT_LIMIT_CHANGED_EVENT_TYPE: &str = "organization.seat_limit_changed";

/// Event payload variants for the Organization & Membership context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OrganizationEventKind {
    /// An organization was founded.
    Created(OrganizationCreated),
    /// An organization was renamed.
    Renamed(OrganizationRenamed),
    /// A member joined.
    MemberAdded(MemberAdded),
    /// A member left.
    MemberRemoved(MemberRemoved),
    /// A member's role changed.
    MemberRoleChanged(MemberRoleChanged),
    /// The seat limit changed.
    SeatLimitChanged(SeatLimitChanged),
}

/// Domain event envelope for the Organization & Membership context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: OrganizationEventKind,
}

impl OrganizationEvent {
    /// Stamps `kind` with fresh metadata for `organization_id`.
    #[must_use]
    pub fn new(
        organization_id: &UniqueId,
        kind: OrganizationEventKind,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        let metadata = EventMetadata::new(
            event_type_of(&kind),
            organization_id,
            correlation_id,
            clock,
        );
        Self { metadata, kind }
    }
}

fn event_type_of(kind: &OrganizationEventKind) -> &'static str {
    match kind {
        OrganizationEventKind::Created(_) => ORGANIZATION_CREATED_EVENT_TYPE,
        OrganizationEventKind::Renamed(_) => ORGANIZATION_RENAMED_EVENT_TYPE,
        OrganizationEventKind::MemberAdded(_) => MEMBER_ADDED_EVENT_TYPE,
        OrganizationEventKind::MemberRemoved(_) => MEMBER_REMOVED_EVENT_TYPE,
        OrganizationEventKind::MemberRoleChanged(_) => MEMBER_ROLE_CHANGED_EVENT_TYPE,
        OrganizationEventKind::SeatLimitChanged(_) => SEAT_LIMIT_CHANGED_EVENT_TYPE,
    }
}

impl DomainEvent for OrganizationEvent {
    fn event_type(&self) -> &'static str {
        event_type_of(&self.kind)
    }

    fn to_payload(&self) -> serde_json::Value {
        // Plain derived structs; serialization cannot fail.
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use salesarena_test_support::FixedClock;

    use super::*;

    #[test]
    fn test_event_type_matches_metadata() {
        let clock = FixedClock::default();
        let event = OrganizationEvent::new(
            &UniqueId::new("org-1"),
            OrganizationEventKind::MemberRemoved(MemberRemoved {
                user_id: UniqueId::new("u-2"),
            }),
            Uuid::nil(),
            &clock,
        );

        assert_eq!(event.event_type(), "organization.member_removed");
        assert_eq!(event.metadata().event_type, "organization.member_removed");
        assert_eq!(event.aggregate_id().as_str(), "org-1");
        assert_eq!(event.occurred_at(), clock.0);
    }

    #[test]
    fn test_payload_is_tagged_json() {
        let event = OrganizationEvent::new(
            &UniqueId::new("org-1"),
            OrganizationEventKind::MemberAdded(MemberAdded {
                user_id: UniqueId::new("u-2"),
                role: MemberRole::Seller,
            }),
            Uuid::nil(),
            &FixedClock::default(),
        );

        assert_eq!(
            event.to_payload(),
            serde_json::json!({
                "type": "member_added",
                "data": { "user_id": "u-2", "role": "seller" }
            })
        );
    }
}
