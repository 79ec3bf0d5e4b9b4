//! Notification adapter fed by the domain event buses.
//!
//! Every published event becomes a [`Notification`] in a bounded,
//! newest-first feed and a structured log line. Handlers never fail, so a
//! full feed only drops the oldest entry.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use salesarena_core::event::DomainEvent;
use salesarena_core::event_bus::{EventBus, Subscription};
use salesarena_core::id::UniqueId;
use salesarena_goals::domain::events::{GOAL_ACHIEVED_EVENT_TYPE, GoalEvent};
use salesarena_organization::domain::events::OrganizationEvent;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Entries kept when no capacity is given.
pub const DEFAULT_FEED_CAPACITY: usize = 200;

/// One feed entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// The event that produced it.
    pub event_id: Uuid,
    /// Event name.
    pub event_type: &'static str,
    /// Aggregate that raised the event.
    pub aggregate_id: UniqueId,
    /// Correlation id of the originating request.
    pub correlation_id: Uuid,
    /// When the transition happened.
    pub occurred_at: DateTime<Utc>,
    /// Event payload.
    pub payload: serde_json::Value,
}

/// Bounded in-memory feed of recent notifications.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    entries: Arc<Mutex<VecDeque<Notification>>>,
    capacity: usize,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

/// Keeps the feed's bus registrations alive.
#[derive(Debug)]
pub struct FeedSubscriptions {
    /// Wildcard registration on the organization bus.
    pub organizations: Subscription<OrganizationEvent>,
    /// Wildcard registration on the goal bus.
    pub goals: Subscription<GoalEvent>,
    /// Registration for achieved goals.
    pub achievements: Subscription<GoalEvent>,
}

impl FeedSubscriptions {
    /// Removes every registration.
    pub fn unsubscribe(&self) {
        self.organizations.unsubscribe();
        self.goals.unsubscribe();
        self.achievements.unsubscribe();
    }
}

impl NotificationFeed {
    /// Creates an empty feed holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Subscribes the feed to both buses.
    #[must_use]
    pub fn attach(
        &self,
        organizations: &EventBus<OrganizationEvent>,
        goals: &EventBus<GoalEvent>,
    ) -> FeedSubscriptions {
        let org_feed = self.clone();
        let goal_feed = self.clone();
        FeedSubscriptions {
            organizations: organizations.subscribe_all(move |event| {
                org_feed.record(event);
                Ok(())
            }),
            goals: goals.subscribe_all(move |event| {
                goal_feed.record(event);
                Ok(())
            }),
            achievements: goals.subscribe(GOAL_ACHIEVED_EVENT_TYPE, |event: &GoalEvent| {
                info!(
                    goal_id = %event.aggregate_id(),
                    payload = %event.to_payload(),
                    "goal achieved"
                );
                Ok(())
            }),
        }
    }

    /// Appends a notification for `event`, evicting the oldest entry when
    /// the feed is full.
    pub fn record<E: DomainEvent>(&self, event: &E) {
        let metadata = event.metadata();
        let notification = Notification {
            event_id: metadata.event_id,
            event_type: event.event_type(),
            aggregate_id: metadata.aggregate_id.clone(),
            correlation_id: metadata.correlation_id,
            occurred_at: metadata.occurred_at,
            payload: event.to_payload(),
        };

        info!(
            event_type = notification.event_type,
            aggregate_id = %notification.aggregate_id,
            correlation_id = %notification.correlation_id,
            "notification recorded"
        );

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(notification);
    }

    /// Up to `limit` notifications, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<Notification> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Number of stored notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
