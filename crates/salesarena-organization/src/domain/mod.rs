//! Domain model for the Organization & Membership context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod value_objects;
