//! Deferred dispatch of aggregate events.
//!
//! Aggregates buffer the events they raise. Those events reach the bus only
//! after the aggregate has been saved, so a transition that fails to persist
//! never produces a notification.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::aggregate::AggregateRoot;
use crate::event::DomainEvent;
use crate::event_bus::{EventBus, PublishReport};
use crate::id::UniqueId;
use crate::repository::Repository;
use crate::result::DomainResult;

/// Result of dispatching one aggregate's buffered events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// The aggregate whose events were dispatched.
    pub aggregate_id: UniqueId,
    /// Ids of the events published, in order.
    pub event_ids: Vec<Uuid>,
    /// One publish report per event.
    pub publishes: Vec<PublishReport>,
}

impl DispatchReport {
    /// Number of handler failures across all published events.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.publishes.iter().map(|report| report.failures.len()).sum()
    }
}

/// Buffers events per aggregate and drains them to an [`EventBus`].
pub struct EventDispatcher<E> {
    bus: EventBus<E>,
    marked: Arc<Mutex<HashMap<UniqueId, Vec<E>>>>,
}

impl<E> Clone for EventDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            bus: self.bus.clone(),
            marked: Arc::clone(&self.marked),
        }
    }
}

impl<E> std::fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marked = self.marked.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("EventDispatcher")
            .field("bus", &self.bus)
            .field("marked_aggregates", &marked.len())
            .finish()
    }
}

impl<E: DomainEvent> EventDispatcher<E> {
    /// Creates a dispatcher that publishes through `bus`.
    #[must_use]
    pub fn new(bus: EventBus<E>) -> Self {
        Self {
            bus,
            marked: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The bus events are published through.
    #[must_use]
    pub fn bus(&self) -> &EventBus<E> {
        &self.bus
    }

    /// Moves the aggregate's pending events into the dispatch buffer.
    /// Returns how many events were moved.
    pub fn mark_aggregate_for_dispatch<A>(&self, aggregate: &mut A) -> usize
    where
        A: AggregateRoot<Event = E>,
    {
        let events = aggregate.pull_domain_events();
        let count = events.len();
        if count > 0 {
            let mut marked = self.marked.lock().unwrap_or_else(PoisonError::into_inner);
            marked
                .entry(aggregate.id().clone())
                .or_default()
                .extend(events);
        }
        count
    }

    /// Number of buffered events for `id`.
    #[must_use]
    pub fn marked_count(&self, id: &UniqueId) -> usize {
        let marked = self.marked.lock().unwrap_or_else(PoisonError::into_inner);
        marked.get(id).map_or(0, Vec::len)
    }

    /// Publishes the buffered events for `id`, in the order they were
    /// raised, and forgets them. Calling it again without a new mark
    /// publishes nothing.
    pub fn dispatch_events_for_aggregate(&self, id: &UniqueId) -> DispatchReport {
        let events = {
            let mut marked = self.marked.lock().unwrap_or_else(PoisonError::into_inner);
            marked.remove(id).unwrap_or_default()
        };
        self.publish_all(id, &events)
    }

    fn publish_all(&self, id: &UniqueId, events: &[E]) -> DispatchReport {
        let mut event_ids = Vec::with_capacity(events.len());
        let mut publishes = Vec::with_capacity(events.len());
        for event in events {
            event_ids.push(event.metadata().event_id);
            publishes.push(self.bus.publish(event));
        }

        debug!(aggregate_id = %id, dispatched = events.len(), "dispatched aggregate events");

        DispatchReport {
            aggregate_id: id.clone(),
            event_ids,
            publishes,
        }
    }

    /// Drops the buffered events for `id` without publishing them.
    /// Returns how many were dropped.
    pub fn discard_events_for_aggregate(&self, id: &UniqueId) -> usize {
        let mut marked = self.marked.lock().unwrap_or_else(PoisonError::into_inner);
        marked.remove(id).map_or(0, |events| events.len())
    }

    /// Saves the aggregate, then publishes the events it raised.
    ///
    /// The events are taken straight off the aggregate rather than through
    /// the shared buffer, so the report only ever names this aggregate
    /// instance's events. If the save fails the pending events are dropped
    /// and nothing is published. On success the aggregate's version is
    /// advanced to match the stored one.
    ///
    /// # Errors
    ///
    /// Returns the repository's error unchanged.
    pub async fn persist_and_dispatch<A, R>(
        &self,
        repository: &R,
        aggregate: &mut A,
    ) -> DomainResult<DispatchReport>
    where
        A: AggregateRoot<Event = E>,
        R: Repository<A> + ?Sized,
    {
        if let Err(err) = repository.save(aggregate).await {
            let dropped = aggregate.pending_events().len();
            aggregate.clear_events();
            warn!(
                aggregate_id = %aggregate.id(),
                dropped,
                error = %err,
                "save failed; pending events discarded"
            );
            return Err(err);
        }

        aggregate.set_version(aggregate.version() + 1);
        let events = aggregate.pull_domain_events();
        Ok(self.publish_all(aggregate.id(), &events))
    }
}
