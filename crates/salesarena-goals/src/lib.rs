//! SalesArena — Sales Goals bounded context.
//!
//! Responsible for the targets sellers work towards, the progress recorded
//! against them, and when a goal counts as achieved.

pub mod application;
pub mod domain;
pub mod infrastructure;
