//! Shared test mocks and utilities for the SalesArena platform.

mod clock;
mod events;
mod invariants;
mod repository;

pub use clock::{FixedClock, fixed_now};
pub use events::EventRecorder;
pub use invariants::assert_invariant_round_trip;
pub use repository::{CountingRepository, FailingRepository, PanickingRepository};
