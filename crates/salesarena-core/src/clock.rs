//! Clock abstraction.
//!
//! Events are stamped with `occurred_at` from an injected clock so tests can
//! pin time.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Abstraction over system time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// A clock shared between use cases.
pub type SharedClock = Arc<dyn Clock>;

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl SystemClock {
    /// The system clock behind a shareable handle.
    #[must_use]
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}
