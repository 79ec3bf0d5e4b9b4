//! SalesArena — Organization & Membership bounded context.
//!
//! Responsible for organizations, their members and roles, and the seat
//! limit bought with the subscription.

pub mod application;
pub mod domain;
pub mod infrastructure;
