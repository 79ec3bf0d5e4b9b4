//! SalesArena Store — repository adapters.
//!
//! The hosted database is an external collaborator; this crate provides the
//! in-process stand-in used by the API server and by tests. It enforces the
//! same contract a real adapter must: version-checked saves, no partial
//! writes, and errors reported as `DomainError`.

pub mod memory;

pub use memory::InMemoryRepository;
