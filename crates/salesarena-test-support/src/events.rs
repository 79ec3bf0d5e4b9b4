//! Event recorder — captures what a bus delivered.

use std::sync::{Arc, Mutex, PoisonError};

use salesarena_core::event::DomainEvent;
use salesarena_core::event_bus::EventBus;

/// Subscribes to a bus and keeps every event it receives.
#[derive(Debug)]
pub struct EventRecorder<E> {
    received: Arc<Mutex<Vec<E>>>,
}

impl<E: DomainEvent> EventRecorder<E> {
    /// Records events named `event_type`.
    #[must_use]
    pub fn attach(bus: &EventBus<E>, event_type: &'static str) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        bus.subscribe(event_type, move |event: &E| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
            Ok(())
        });
        Self { received }
    }

    /// Records every event published on the bus.
    #[must_use]
    pub fn attach_all(bus: &EventBus<E>) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        bus.subscribe_all(move |event: &E| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
            Ok(())
        });
        Self { received }
    }

    /// Snapshot of the events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<E> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of the events received so far, in delivery order.
    #[must_use]
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events().iter().map(DomainEvent::event_type).collect()
    }
}
