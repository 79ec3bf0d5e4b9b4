//! Application layer for the Sales Goals context.

pub mod query_handlers;
pub mod use_cases;
