//! Aggregate roots for the Organization & Membership context.

use std::collections::HashSet;

use salesarena_core::aggregate::{AggregateRoot, AggregateState, Invariants};
use salesarena_core::clock::Clock;
use salesarena_core::error::DomainError;
use salesarena_core::id::UniqueId;
use salesarena_core::result::{DomainResult, OptionExt};
use uuid::Uuid;

use super::events::{
    MemberAdded, MemberRemoved, MemberRoleChanged, OrganizationCreated, OrganizationEvent,
    OrganizationEventKind, OrganizationRenamed, SeatLimitChanged,
};
use super::value_objects::{Member, MemberRole, OrganizationName, SeatLimit};

/// Rejection when the same user would appear twice.
pub const DUPLICATE_MEMBER: &str = "Användaren är redan medlem i organisationen";
/// Broken invariant: nobody owns the organization.
pub const OWNER_REQUIRED: &str = "Organisationen måste ha minst en ägare";
/// Broken invariant: more members than paid seats.
pub const SEATS_EXCEEDED: &str = "Antalet medlemmar överskrider antalet licenser";

/// Kind name used when a member lookup fails.
pub const MEMBER_KIND: &str = "member";

/// State of an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationProps {
    /// Display name.
    pub name: OrganizationName,
    /// Paid seats.
    pub seat_limit: SeatLimit,
    /// Members in join order.
    pub members: Vec<Member>,
}

impl OrganizationProps {
    fn member_mut(&mut self, user_id: &UniqueId) -> DomainResult<&mut Member> {
        self.members
            .iter_mut()
            .find(|member| member.user_id == *user_id)
            .or_not_found(MEMBER_KIND, user_id)
    }
}

impl Invariants for OrganizationProps {
    fn check_invariants(&self) -> DomainResult<()> {
        let mut seen = HashSet::with_capacity(self.members.len());
        if !self.members.iter().all(|member| seen.insert(&member.user_id)) {
            return Err(DomainError::invariant(DUPLICATE_MEMBER));
        }
        if !self
            .members
            .iter()
            .any(|member| member.role == MemberRole::Owner)
        {
            return Err(DomainError::invariant(OWNER_REQUIRED));
        }
        let seats = usize::try_from(self.seat_limit.seats()).unwrap_or(usize::MAX);
        if self.members.len() > seats {
            return Err(DomainError::invariant(SEATS_EXCEEDED));
        }
        Ok(())
    }
}

/// Aggregate root for an organization and its memberships.
#[derive(Debug, Clone)]
pub struct Organization {
    state: AggregateState<OrganizationProps, OrganizationEvent>,
}

impl Organization {
    /// Founds an organization with `owner_id` as its only member.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` if the initial state is
    /// inconsistent.
    pub fn create(
        id: UniqueId,
        name: OrganizationName,
        owner_id: UniqueId,
        seat_limit: SeatLimit,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> DomainResult<Self> {
        let founder = owner_id.clone();
        let props = OrganizationProps {
            name,
            seat_limit,
            members: vec![Member {
                user_id: owner_id,
                role: MemberRole::Owner,
                joined_at: clock.now(),
            }],
        };
        let state = AggregateState::create(id, props, |id, props| {
            OrganizationEvent::new(
                id,
                OrganizationEventKind::Created(OrganizationCreated {
                    name: props.name.to_string(),
                    owner_id: founder,
                    seat_limit: props.seat_limit.seats(),
                }),
                correlation_id,
                clock,
            )
        })?;
        Ok(Self { state })
    }

    /// Rebuilds a persisted organization. Raises no events.
    #[must_use]
    pub fn restore(id: UniqueId, version: u64, props: OrganizationProps) -> Self {
        Self {
            state: AggregateState::restore(id, version, props),
        }
    }

    /// Renames the organization.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `name` equals the current name.
    pub fn rename(
        &mut self,
        name: OrganizationName,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> DomainResult<()> {
        let id = self.state.id().clone();
        self.state.transition(|draft| {
            if draft.name == name {
                return Err(DomainError::validation(
                    "Nytt namn måste skilja sig från nuvarande namn",
                ));
            }
            let previous = std::mem::replace(&mut draft.name, name);
            Ok(OrganizationEvent::new(
                &id,
                OrganizationEventKind::Renamed(OrganizationRenamed {
                    previous_name: previous.to_string(),
                    name: draft.name.to_string(),
                }),
                correlation_id,
                clock,
            ))
        })
    }

    /// Adds `user_id` with `role`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the user already is a member, or
    /// `DomainError::InvariantViolation` if every seat is taken.
    pub fn add_member(
        &mut self,
        user_id: UniqueId,
        role: MemberRole,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> DomainResult<()> {
        let id = self.state.id().clone();
        self.state.transition(|draft| {
            if draft.members.iter().any(|member| member.user_id == user_id) {
                return Err(DomainError::validation(DUPLICATE_MEMBER));
            }
            draft.members.push(Member {
                user_id: user_id.clone(),
                role,
                joined_at: clock.now(),
            });
            Ok(OrganizationEvent::new(
                &id,
                OrganizationEventKind::MemberAdded(MemberAdded { user_id, role }),
                correlation_id,
                clock,
            ))
        })
    }

    /// Removes `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown member, or
    /// `DomainError::InvariantViolation` when removing the last owner.
    pub fn remove_member(
        &mut self,
        user_id: &UniqueId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> DomainResult<()> {
        let id = self.state.id().clone();
        self.state.transition(|draft| {
            let position = draft
                .members
                .iter()
                .position(|member| member.user_id == *user_id)
                .or_not_found(MEMBER_KIND, user_id)?;
            draft.members.remove(position);
            Ok(OrganizationEvent::new(
                &id,
                OrganizationEventKind::MemberRemoved(MemberRemoved {
                    user_id: user_id.clone(),
                }),
                correlation_id,
                clock,
            ))
        })
    }

    /// Gives `user_id` a new role.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown member,
    /// `DomainError::Validation` if the role is unchanged, or
    /// `DomainError::InvariantViolation` when demoting the last owner.
    pub fn change_member_role(
        &mut self,
        user_id: &UniqueId,
        role: MemberRole,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> DomainResult<()> {
        let id = self.state.id().clone();
        self.state.transition(|draft| {
            let member = draft.member_mut(user_id)?;
            if member.role == role {
                return Err(DomainError::validation(format!(
                    "Medlemmen har redan rollen {role}"
                )));
            }
            let previous_role = std::mem::replace(&mut member.role, role);
            Ok(OrganizationEvent::new(
                &id,
                OrganizationEventKind::MemberRoleChanged(MemberRoleChanged {
                    user_id: user_id.clone(),
                    previous_role,
                    role,
                }),
                correlation_id,
                clock,
            ))
        })
    }

    /// Replaces the seat limit.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the limit is unchanged, or
    /// `DomainError::InvariantViolation` if it is below the member count.
    pub fn change_seat_limit(
        &mut self,
        seat_limit: SeatLimit,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> DomainResult<()> {
        let id = self.state.id().clone();
        self.state.transition(|draft| {
            if draft.seat_limit == seat_limit {
                return Err(DomainError::validation(
                    "Antalet licenser är redan satt till detta värde",
                ));
            }
            let previous = std::mem::replace(&mut draft.seat_limit, seat_limit);
            Ok(OrganizationEvent::new(
                &id,
                OrganizationEventKind::SeatLimitChanged(SeatLimitChanged {
                    previous_seats: previous.seats(),
                    seats: draft.seat_limit.seats(),
                }),
                correlation_id,
                clock,
            ))
        })
    }

    /// The organization's name.
    #[must_use]
    pub fn name(&self) -> &OrganizationName {
        &self.state.props().name
    }

    /// The paid seat count.
    #[must_use]
    pub fn seat_limit(&self) -> &SeatLimit {
        &self.state.props().seat_limit
    }

    /// Members in join order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.state.props().members
    }

    /// Looks up one member.
    #[must_use]
    pub fn member(&self, user_id: &UniqueId) -> Option<&Member> {
        self.members()
            .iter()
            .find(|member| member.user_id == *user_id)
    }

    /// `true` if `user_id` belongs to the organization.
    #[must_use]
    pub fn is_member(&self, user_id: &UniqueId) -> bool {
        self.member(user_id).is_some()
    }

    /// The full props, for persistence adapters.
    #[must_use]
    pub fn props(&self) -> &OrganizationProps {
        self.state.props()
    }

    #[cfg(test)]
    pub(crate) fn props_mut_unchecked(&mut self) -> &mut OrganizationProps {
        self.state.props_mut_unchecked()
    }
}

impl AggregateRoot for Organization {
    type Event = OrganizationEvent;
    const KIND: &'static str = "organization";

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

    fn pending_events(&self) -> &[OrganizationEvent] {
        self.state.pending_events()
    }

    fn pull_domain_events(&mut self) -> Vec<OrganizationEvent> {
        self.state.pull_domain_events()
    }
}

#[cfg(test)]
mod tests {
    use salesarena_core::event::DomainEvent;
    use salesarena_test_support::{FixedClock, assert_invariant_round_trip};

    use super::*;

    fn acme(seats: u32) -> Organization {
        Organization::create(
            UniqueId::new("org-1"),
            OrganizationName::create("Acme").unwrap(),
            UniqueId::new("owner"),
            SeatLimit::create(seats).unwrap(),
            Uuid::nil(),
            &FixedClock::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_seats_owner_and_raises_created_event() {
        // Arrange / Act
        let org = acme(5);

        // Assert
        assert_eq!(org.version(), 0);
        assert_eq!(org.members().len(), 1);
        assert_eq!(org.members()[0].role, MemberRole::Owner);
        let events = org.pending_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "organization.created");
        match &events[0].kind {
            OrganizationEventKind::Created(created) => {
                assert_eq!(created.name, "Acme");
                assert_eq!(created.owner_id.as_str(), "owner");
                assert_eq!(created.seat_limit, 5);
            }
            other => panic!("expected Created, got {other:?}"),
        }
    }

    #[test]
    fn test_add_duplicate_member_is_rejected_without_side_effects() {
        // Arrange
        let clock = FixedClock::default();
        let mut org = acme(5);
        org.add_member(UniqueId::new("u-2"), MemberRole::Seller, Uuid::nil(), &clock)
            .unwrap();
        org.pull_domain_events();

        // Act
        let result = org.add_member(UniqueId::new("u-2"), MemberRole::Admin, Uuid::nil(), &clock);

        // Assert
        assert_eq!(result, Err(DomainError::validation(DUPLICATE_MEMBER)));
        assert_eq!(org.members().len(), 2);
        assert_eq!(org.member(&UniqueId::new("u-2")).unwrap().role, MemberRole::Seller);
        assert!(org.pending_events().is_empty());
    }

    #[test]
    fn test_add_member_beyond_seat_limit_violates_invariant() {
        let clock = FixedClock::default();
        let mut org = acme(2);
        org.add_member(UniqueId::new("u-2"), MemberRole::Seller, Uuid::nil(), &clock)
            .unwrap();
        org.pull_domain_events();

        let result = org.add_member(UniqueId::new("u-3"), MemberRole::Seller, Uuid::nil(), &clock);

        assert_eq!(result, Err(DomainError::invariant(SEATS_EXCEEDED)));
        assert_eq!(org.members().len(), 2);
        assert!(org.pending_events().is_empty());
    }

    #[test]
    fn test_removing_last_owner_is_rejected() {
        let mut org = acme(5);
        org.pull_domain_events();

        let result = org.remove_member(&UniqueId::new("owner"), Uuid::nil(), &FixedClock::default());

        assert_eq!(result, Err(DomainError::invariant(OWNER_REQUIRED)));
        assert!(org.is_member(&UniqueId::new("owner")));
    }

    #[test]
    fn test_remove_unknown_member_is_not_found() {
        let mut org = acme(5);

        let result = org.remove_member(&UniqueId::new("ghost"), Uuid::nil(), &FixedClock::default());

        assert_eq!(
            result,
            Err(DomainError::not_found(MEMBER_KIND, &UniqueId::new("ghost")))
        );
    }

    #[test]
    fn test_promote_then_demote_keeps_one_owner() {
        // Arrange
        let clock = FixedClock::default();
        let mut org = acme(5);
        org.add_member(UniqueId::new("u-2"), MemberRole::Manager, Uuid::nil(), &clock)
            .unwrap();

        // Act
        org.change_member_role(&UniqueId::new("u-2"), MemberRole::Owner, Uuid::nil(), &clock)
            .unwrap();
        org.change_member_role(&UniqueId::new("owner"), MemberRole::Seller, Uuid::nil(), &clock)
            .unwrap();

        // Assert
        let types: Vec<&str> = org
            .pull_domain_events()
            .iter()
            .map(DomainEvent::event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                "organization.created",
                "organization.member_added",
                "organization.member_role_changed",
                "organization.member_role_changed",
            ]
        );
        assert_eq!(org.member(&UniqueId::new("owner")).unwrap().role, MemberRole::Seller);
    }

    #[test]
    fn test_unchanged_role_is_rejected() {
        let mut org = acme(5);

        let result = org.change_member_role(
            &UniqueId::new("owner"),
            MemberRole::Owner,
            Uuid::nil(),
            &FixedClock::default(),
        );

        assert!(matches!(result, Err(DomainError::Validation(msg)) if msg.contains("owner")));
    }

    #[test]
    fn test_rename_to_same_name_is_rejected() {
        let clock = FixedClock::default();
        let mut org = acme(5);
        org.pull_domain_events();

        let same = org.rename(OrganizationName::create(" Acme ").unwrap(), Uuid::nil(), &clock);
        org.rename(OrganizationName::create("Acme Nord").unwrap(), Uuid::nil(), &clock)
            .unwrap();

        assert!(matches!(same, Err(DomainError::Validation(_))));
        assert_eq!(org.name().as_str(), "Acme Nord");
        assert_eq!(org.pending_events().len(), 1);
    }

    #[test]
    fn test_seat_limit_cannot_drop_below_member_count() {
        let clock = FixedClock::default();
        let mut org = acme(5);
        org.add_member(UniqueId::new("u-2"), MemberRole::Seller, Uuid::nil(), &clock)
            .unwrap();

        let result = org.change_seat_limit(SeatLimit::create(1).unwrap(), Uuid::nil(), &clock);
        org.change_seat_limit(SeatLimit::create(2).unwrap(), Uuid::nil(), &clock)
            .unwrap();

        assert_eq!(result, Err(DomainError::invariant(SEATS_EXCEEDED)));
        assert_eq!(org.seat_limit().seats(), 2);
    }

    #[test]
    fn test_pull_domain_events_drains_once() {
        let mut org = acme(5);

        assert_eq!(org.pull_domain_events().len(), 1);
        assert!(org.pull_domain_events().is_empty());
    }

    #[test]
    fn test_invariant_round_trip_on_owner_rule() {
        let mut org = acme(5);

        assert_invariant_round_trip(
            &mut org,
            |org| org.props_mut_unchecked().members[0].role = MemberRole::Seller,
            |org| org.props_mut_unchecked().members[0].role = MemberRole::Owner,
        );
    }

    #[test]
    fn test_restore_raises_no_events() {
        let org = acme(5);
        let restored = Organization::restore(org.id().clone(), 4, org.props().clone());

        assert_eq!(restored.version(), 4);
        assert!(restored.pending_events().is_empty());
        assert_eq!(restored.name(), org.name());
    }
}
