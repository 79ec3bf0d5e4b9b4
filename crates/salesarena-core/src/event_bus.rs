//! In-process publish/subscribe bus for domain events.
//!
//! The bus is an ordinary value: construct one at startup, clone the handle
//! into every use case and notification adapter that needs it, and drop it
//! at shutdown. Clones share one handler registry.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use thiserror::Error;
use tracing::{debug, error};

use crate::event::DomainEvent;

/// Failure reported by a single event handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    /// Builds a handler error from any message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// What an event handler returns.
pub type HandlerResult = Result<(), HandlerError>;

type Handler<E> = Arc<dyn Fn(&E) -> HandlerResult + Send + Sync>;

/// Identifies one registration on a bus.
pub type SubscriptionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Named(&'static str),
    All,
}

struct Registration<E> {
    id: SubscriptionId,
    handler: Handler<E>,
}

impl<E> Clone for Registration<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
        }
    }
}

struct Registry<E> {
    next_id: SubscriptionId,
    named: HashMap<&'static str, Vec<Registration<E>>>,
    wildcard: Vec<Registration<E>>,
}

impl<E> Registry<E> {
    fn remove(&mut self, topic: Topic, id: SubscriptionId) -> bool {
        let list = match topic {
            Topic::Named(name) => match self.named.get_mut(name) {
                Some(list) => list,
                None => return false,
            },
            Topic::All => &mut self.wildcard,
        };
        let before = list.len();
        list.retain(|registration| registration.id != id);
        let removed = list.len() != before;
        if let Topic::Named(name) = topic {
            if self.named.get(name).is_some_and(Vec::is_empty) {
                self.named.remove(name);
            }
        }
        removed
    }
}

/// Handle returned by [`EventBus::subscribe`]. Dropping it keeps the
/// handler registered; call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription<E> {
    id: SubscriptionId,
    topic: Topic,
    registry: Weak<RwLock<Registry<E>>>,
}

impl<E> Subscription<E> {
    /// Identifier of this registration.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the handler. Returns `false` if it was already removed or the
    /// bus no longer exists.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut guard = registry.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(self.topic, self.id)
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

/// One handler that failed during a publish pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// The registration that failed.
    pub subscription_id: SubscriptionId,
    /// What went wrong, including panic messages.
    pub reason: String,
}

/// Outcome of one [`EventBus::publish`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// The published event's name.
    pub event_type: &'static str,
    /// Number of handlers invoked.
    pub invoked: usize,
    /// Handlers that returned an error or panicked.
    pub failures: Vec<HandlerFailure>,
}

impl PublishReport {
    /// `true` when every invoked handler succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Synchronous, in-process event bus.
pub struct EventBus<E> {
    registry: Arc<RwLock<Registry<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry {
                next_id: 1,
                named: HashMap::new(),
                wildcard: Vec::new(),
            })),
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("EventBus")
            .field("topics", &guard.named.len())
            .field("wildcard_handlers", &guard.wildcard.len())
            .finish()
    }
}

impl<E: DomainEvent> EventBus<E> {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events named `event_type`. Handlers for the
    /// same name run in registration order.
    pub fn subscribe<F>(&self, event_type: &'static str, handler: F) -> Subscription<E>
    where
        F: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Topic::Named(event_type), Arc::new(handler))
    }

    /// Registers `handler` for every event. Wildcard handlers run after the
    /// named handlers of each event.
    pub fn subscribe_all<F>(&self, handler: F) -> Subscription<E>
    where
        F: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Topic::All, Arc::new(handler))
    }

    /// Removes a registration. Returns `false` if it was not present.
    pub fn unsubscribe(&self, subscription: &Subscription<E>) -> bool {
        let mut guard = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(subscription.topic, subscription.id)
    }

    /// Number of handlers registered under `event_type`, wildcards excluded.
    #[must_use]
    pub fn handler_count(&self, event_type: &str) -> usize {
        let guard = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        guard.named.get(event_type).map_or(0, Vec::len)
    }

    /// Invokes every handler currently registered for the event's name, then
    /// every wildcard handler, once each.
    ///
    /// The handler list is snapshotted before the first call, so handlers
    /// that subscribe or unsubscribe during dispatch only affect later
    /// publishes. A failing or panicking handler is logged and recorded in
    /// the report; the remaining handlers still run. Nothing is retried.
    pub fn publish(&self, event: &E) -> PublishReport {
        let event_type = event.event_type();
        let snapshot: Vec<Registration<E>> = {
            let guard = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            guard
                .named
                .get(event_type)
                .into_iter()
                .flatten()
                .chain(guard.wildcard.iter())
                .cloned()
                .collect()
        };

        debug!(
            event_type,
            event_id = %event.metadata().event_id,
            handlers = snapshot.len(),
            "publishing domain event"
        );

        let mut failures = Vec::new();
        for registration in &snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| (registration.handler)(event)));
            let reason = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.0,
                Err(panic) => format!("handler panicked: {}", panic_message(panic.as_ref())),
            };
            error!(
                event_type,
                subscription_id = registration.id,
                reason = %reason,
                "event handler failed"
            );
            failures.push(HandlerFailure {
                subscription_id: registration.id,
                reason,
            });
        }

        PublishReport {
            event_type,
            invoked: snapshot.len(),
            failures,
        }
    }

    fn register(&self, topic: Topic, handler: Handler<E>) -> Subscription<E> {
        let mut guard = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let id = guard.next_id;
        guard.next_id += 1;
        let registration = Registration { id, handler };
        match topic {
            Topic::Named(name) => guard.named.entry(name).or_default().push(registration),
            Topic::All => guard.wildcard.push(registration),
        }
        Subscription {
            id,
            topic,
            registry: Arc::downgrade(&self.registry),
        }
    }
}

/// Best-effort text for a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::event::EventMetadata;
    use crate::id::UniqueId;

    #[derive(Debug, Clone)]
    struct Ping {
        name: &'static str,
        metadata: EventMetadata,
    }

    impl Ping {
        fn named(name: &'static str) -> Self {
            Self {
                name,
                metadata: EventMetadata {
                    event_id: Uuid::new_v4(),
                    event_type: name.to_owned(),
                    aggregate_id: UniqueId::new("agg-1"),
                    correlation_id: Uuid::nil(),
                    occurred_at: Utc::now(),
                },
            }
        }
    }

    impl DomainEvent for Ping {
        fn event_type(&self) -> &'static str {
            self.name
        }

        fn to_payload(&self) -> serde_json::Value {
            serde_json::Value::Null
        }

        fn metadata(&self) -> &EventMetadata {
            &self.metadata
        }
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &'static str) -> impl Fn(&Ping) -> HandlerResult + use<> {
        let log = Arc::clone(log);
        move |_event: &Ping| {
            log.lock().unwrap().push(label.to_owned());
            Ok(())
        }
    }

    #[test]
    fn test_publish_invokes_handlers_in_registration_order() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe("ping", recorder(&log, "first"));
        bus.subscribe("ping", recorder(&log, "second"));
        bus.subscribe("pong", recorder(&log, "other"));

        // Act
        let report = bus.publish(&Ping::named("ping"));

        // Assert
        assert_eq!(report.invoked, 2);
        assert!(report.is_clean());
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_failing_handler_does_not_stop_others() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe("ping", |_: &Ping| Err(HandlerError::new("smtp down")));
        bus.subscribe("ping", |_: &Ping| -> HandlerResult { panic!("bad subscriber") });
        bus.subscribe("ping", recorder(&log, "survivor"));

        // Act
        let report = bus.publish(&Ping::named("ping"));

        // Assert
        assert_eq!(report.invoked, 3);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].reason, "smtp down");
        assert!(report.failures[1].reason.contains("bad subscriber"));
        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    }

    #[test]
    fn test_unsubscribe_removes_handler_once() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let subscription = bus.subscribe("ping", recorder(&log, "gone"));

        assert!(subscription.unsubscribe());
        assert!(!bus.unsubscribe(&subscription));

        let report = bus.publish(&Ping::named("ping"));
        assert_eq!(report.invoked, 0);
        assert_eq!(bus.handler_count("ping"), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_wildcard_handlers_run_after_named_handlers() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe_all(recorder(&log, "audit"));
        bus.subscribe("ping", recorder(&log, "named"));

        bus.publish(&Ping::named("ping"));
        bus.publish(&Ping::named("pong"));

        assert_eq!(*log.lock().unwrap(), vec!["named", "audit", "audit"]);
    }

    #[test]
    fn test_subscription_changes_during_dispatch_apply_to_next_publish() {
        // Arrange: the first handler registers a late handler while the bus
        // is dispatching.
        let bus: EventBus<Ping> = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner_bus = bus.clone();
        let inner_log = Arc::clone(&log);
        bus.subscribe("ping", move |_: &Ping| {
            inner_bus.subscribe("ping", recorder(&inner_log, "late"));
            Ok(())
        });

        // Act
        let first = bus.publish(&Ping::named("ping"));
        let second = bus.publish(&Ping::named("ping"));

        // Assert
        assert_eq!(first.invoked, 1);
        assert_eq!(second.invoked, 2);
        assert_eq!(*log.lock().unwrap(), vec!["late"]);
    }

    #[test]
    fn test_clones_share_one_registry() {
        let bus: EventBus<Ping> = EventBus::new();
        let clone = bus.clone();
        clone.subscribe("ping", |_: &Ping| Ok(()));
        assert_eq!(bus.handler_count("ping"), 1);
    }

    #[test]
    fn test_unsubscribe_after_bus_dropped_is_noop() {
        let bus: EventBus<Ping> = EventBus::new();
        let subscription = bus.subscribe("ping", |_: &Ping| Ok(()));
        drop(bus);
        assert!(!subscription.unsubscribe());
    }

    #[test]
    fn test_concurrent_subscribe_and_publish() {
        let bus: EventBus<Ping> = EventBus::new();
        let counter = Arc::new(Mutex::new(0_usize));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let bus = bus.clone();
                let counter = Arc::clone(&counter);
                scope.spawn(move || {
                    for _ in 0..25 {
                        let counter = Arc::clone(&counter);
                        bus.subscribe("ping", move |_: &Ping| {
                            *counter.lock().unwrap() += 1;
                            Ok(())
                        });
                        bus.publish(&Ping::named("ping"));
                    }
                });
            }
        });

        assert_eq!(bus.handler_count("ping"), 100);
        assert_eq!(bus.publish(&Ping::named("ping")).invoked, 100);
    }
}
