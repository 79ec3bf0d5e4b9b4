//! Domain model for the Sales Goals context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod value_objects;
