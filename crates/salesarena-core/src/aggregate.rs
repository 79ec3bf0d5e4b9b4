//! Aggregate root abstraction.
//!
//! An aggregate is an identity-bearing consistency boundary. Its props only
//! change through [`AggregateState::transition`], which applies the change
//! to a draft, rechecks every invariant, and commits the new props together
//! with the event that describes them. A rejected transition leaves both the
//! props and the pending-event queue exactly as they were.

use crate::event::DomainEvent;
use crate::id::UniqueId;
use crate::result::DomainResult;

/// Consistency rules that must hold for an aggregate's props at every
/// observable point.
pub trait Invariants {
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` naming the broken rule.
    fn check_invariants(&self) -> DomainResult<()>;
}

/// Trait for aggregate roots handled by repositories and the dispatcher.
pub trait AggregateRoot: Send + Sync + 'static {
    /// The event type this aggregate produces.
    type Event: DomainEvent;

    /// Aggregate kind, used in not-found errors and logs.
    const KIND: &'static str;

    /// Returns the aggregate identifier.
    fn id(&self) -> &UniqueId;

    /// Returns the persisted version this instance was loaded at.
    fn version(&self) -> u64;

    /// Records the version assigned by the repository.
    fn set_version(&mut self, version: u64);

    /// Rechecks every invariant against the current props.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` naming the broken rule.
    fn validate_invariants(&self) -> DomainResult<()>;

    /// Events raised since the last drain.
    fn pending_events(&self) -> &[Self::Event];

    /// Drains the pending queue. A second call without an intervening
    /// transition returns an empty list.
    fn pull_domain_events(&mut self) -> Vec<Self::Event>;

    /// Drops pending events without returning them.
    fn clear_events(&mut self) {
        drop(self.pull_domain_events());
    }
}

/// Reusable aggregate body: identity, version, props and pending events.
#[derive(Debug, Clone)]
pub struct AggregateState<P, E> {
    id: UniqueId,
    version: u64,
    props: P,
    pending_events: Vec<E>,
}

impl<P, E> AggregateState<P, E>
where
    P: Invariants + Clone,
    E: DomainEvent,
{
    /// Validates the initial props and queues the "created" event.
    ///
    /// # Errors
    ///
    /// Returns the first invariant the initial props break.
    pub fn create(
        id: UniqueId,
        props: P,
        created: impl FnOnce(&UniqueId, &P) -> E,
    ) -> DomainResult<Self> {
        props.check_invariants()?;
        let event = created(&id, &props);
        Ok(Self {
            id,
            version: 0,
            props,
            pending_events: vec![event],
        })
    }

    /// Rebuilds an aggregate from persisted state. No event is raised.
    #[must_use]
    pub fn restore(id: UniqueId, version: u64, props: P) -> Self {
        Self {
            id,
            version,
            props,
            pending_events: Vec::new(),
        }
    }

    /// Applies `change` to a draft of the props. The draft is committed,
    /// together with the returned event, only if `change` succeeds and the
    /// draft satisfies every invariant.
    ///
    /// # Errors
    ///
    /// Returns the rejection from `change` or the broken invariant. The
    /// aggregate is untouched in both cases.
    pub fn transition(
        &mut self,
        change: impl FnOnce(&mut P) -> DomainResult<E>,
    ) -> DomainResult<()> {
        self.transition_many(|draft| change(draft).map(|event| vec![event]))
    }

    /// Like [`Self::transition`], for changes that raise several events at once.
    ///
    /// # Errors
    ///
    /// Returns the rejection from `change` or the broken invariant.
    pub fn transition_many(
        &mut self,
        change: impl FnOnce(&mut P) -> DomainResult<Vec<E>>,
    ) -> DomainResult<()> {
        let mut draft = self.props.clone();
        let events = change(&mut draft)?;
        draft.check_invariants()?;
        self.props = draft;
        self.pending_events.extend(events);
        Ok(())
    }

    /// Aggregate identifier.
    #[must_use]
    pub fn id(&self) -> &UniqueId {
        &self.id
    }

    /// Persisted version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Records the version assigned by the repository.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Current props.
    #[must_use]
    pub fn props(&self) -> &P {
        &self.props
    }

    /// Rechecks invariants against the current props.
    ///
    /// # Errors
    ///
    /// Returns the broken invariant.
    pub fn validate_invariants(&self) -> DomainResult<()> {
        self.props.check_invariants()
    }

    /// Events raised since the last drain.
    #[must_use]
    pub fn pending_events(&self) -> &[E] {
        &self.pending_events
    }

    /// Drains the pending-event queue.
    pub fn pull_domain_events(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending_events)
    }

    /// Mutable props with no invariant check, for tests that corrupt state
    /// deliberately.
    #[cfg(any(test, feature = "testing"))]
    pub fn props_mut_unchecked(&mut self) -> &mut P {
        &mut self.props
    }
}
