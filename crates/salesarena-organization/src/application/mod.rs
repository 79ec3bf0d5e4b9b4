//! Application layer for the Organization & Membership context.

pub mod query_handlers;
pub mod use_cases;
