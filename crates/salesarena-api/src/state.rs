//! Shared application state.

use std::fmt;
use std::sync::Arc;

use salesarena_core::clock::SharedClock;
use salesarena_core::dispatcher::EventDispatcher;
use salesarena_core::event_bus::EventBus;
use salesarena_goals::application::use_cases::GoalServices;
use salesarena_goals::domain::aggregates::Goal;
use salesarena_goals::domain::events::GoalEvent;
use salesarena_goals::infrastructure::GoalRepository;
use salesarena_organization::application::use_cases::OrganizationServices;
use salesarena_organization::domain::aggregates::Organization;
use salesarena_organization::domain::events::OrganizationEvent;
use salesarena_organization::infrastructure::OrganizationRepository;
use salesarena_store::InMemoryRepository;

use crate::notifications::{FeedSubscriptions, NotificationFeed};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read side for organizations.
    pub organizations: Arc<dyn OrganizationRepository>,
    /// Read side for goals.
    pub goals: Arc<dyn GoalRepository>,
    /// Collaborators for organization use cases.
    pub organization_services: OrganizationServices,
    /// Collaborators for goal use cases.
    pub goal_services: GoalServices,
    /// Bus carrying organization events.
    pub organization_events: EventBus<OrganizationEvent>,
    /// Bus carrying goal events.
    pub goal_events: EventBus<GoalEvent>,
    /// Recent notifications.
    pub feed: NotificationFeed,
    /// The feed's bus registrations; unsubscribe them to detach the feed.
    pub feed_subscriptions: Arc<FeedSubscriptions>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("organization_events", &self.organization_events)
            .field("goal_events", &self.goal_events)
            .field("feed_len", &self.feed.len())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state over the given repositories. The
    /// notification feed is subscribed to both buses.
    pub fn new<O, G>(organizations: Arc<O>, goals: Arc<G>, clock: SharedClock) -> Self
    where
        O: OrganizationRepository + 'static,
        G: GoalRepository + 'static,
    {
        let organization_events = EventBus::new();
        let goal_events = EventBus::new();

        let organization_services = OrganizationServices::new(
            organizations.clone(),
            EventDispatcher::new(organization_events.clone()),
            Arc::clone(&clock),
        );
        let goal_services = GoalServices::new(
            goals.clone(),
            EventDispatcher::new(goal_events.clone()),
            clock,
        );

        let feed = NotificationFeed::default();
        let feed_subscriptions = Arc::new(feed.attach(&organization_events, &goal_events));

        Self {
            organizations,
            goals,
            organization_services,
            goal_services,
            organization_events,
            goal_events,
            feed,
            feed_subscriptions,
        }
    }

    /// State backed by the in-memory store.
    #[must_use]
    pub fn in_memory(clock: SharedClock) -> Self {
        Self::new(
            Arc::new(InMemoryRepository::<Organization>::new()),
            Arc::new(InMemoryRepository::<Goal>::new()),
            clock,
        )
    }
}
