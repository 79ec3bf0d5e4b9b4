//! The outcome type used by every fallible domain operation.
//!
//! The standard `Result` already is the sum type the domain needs: exactly
//! one branch, immutable once built, and only readable through a `match` or
//! a combinator. The vocabulary is `is_ok` / `is_err` / `map` / `map_err` /
//! `and_then` / `unwrap_or`. Unchecked extraction is denied by the workspace
//! clippy configuration outside of tests.

use crate::error::DomainError;
use crate::id::UniqueId;

/// Outcome of a domain operation.
pub type DomainResult<T> = Result<T, DomainError>;

/// Converts a missing lookup into [`DomainError::NotFound`].
pub trait OptionExt<T> {
    /// # Errors
    ///
    /// Returns `NotFound` for `None`.
    fn or_not_found(self, kind: &'static str, id: &UniqueId) -> DomainResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, kind: &'static str, id: &UniqueId) -> DomainResult<T> {
        self.ok_or_else(|| DomainError::not_found(kind, id))
    }
}

/// Emits a warning for the error branch and passes the result through.
pub trait LogErr {
    /// Logs under `operation` when `self` is an error.
    #[must_use]
    fn log_err(self, operation: &str) -> Self;
}

impl<T> LogErr for DomainResult<T> {
    fn log_err(self, operation: &str) -> Self {
        if let Err(err) = &self {
            if err.is_business_failure() {
                tracing::warn!(operation, error = %err, "operation rejected");
            } else {
                tracing::error!(operation, error = %err, "operation failed");
            }
        }
        self
    }
}
