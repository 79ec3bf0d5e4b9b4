//! Command abstractions.
//!
//! Commands are the input DTOs handed to a use case.

use uuid::Uuid;

use crate::error::DomainError;
use crate::result::DomainResult;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// Checks that every required field is present. Runs before the use
    /// case touches any repository.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the missing field.
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }
}

/// Fails with `"<field> krävs"` when `value` is empty or whitespace.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank value.
pub fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} krävs")));
    }
    Ok(())
}
