//! SalesArena Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that all bounded
//! contexts depend on: identities, the `Result` discipline, value objects,
//! aggregates, domain events and their bus, and the use-case/repository
//! seam. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod event_bus;
pub mod id;
pub mod repository;
pub mod result;
pub mod use_case;
pub mod value_object;

pub use error::DomainError;
pub use id::UniqueId;
pub use result::{DomainResult, LogErr, OptionExt};
