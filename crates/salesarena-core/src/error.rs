//! Domain error types.

use thiserror::Error;

use crate::id::UniqueId;

/// Top-level domain error type.
///
/// Every business-level failure travels as one of these variants inside a
/// `Result`. Panics are reserved for programmer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input or value-object construction failed a declarative rule.
    #[error("{0}")]
    Validation(String),

    /// An aggregate transition would have broken an invariant. State is unchanged.
    #[error("{0}")]
    InvariantViolation(String),

    /// An aggregate was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The kind of aggregate that was requested.
        kind: &'static str,
        /// The requested identifier.
        id: UniqueId,
    },

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on {id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        id: UniqueId,
        /// The expected version.
        expected: u64,
        /// The actual version found.
        actual: u64,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// A fault that escaped a use case as a panic.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl DomainError {
    /// Shorthand for a [`DomainError::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a [`DomainError::InvariantViolation`].
    #[must_use]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Shorthand for a [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(kind: &'static str, id: &UniqueId) -> Self {
        Self::NotFound {
            kind,
            id: id.clone(),
        }
    }

    /// Returns `true` for failures the caller can fix by correcting input
    /// or retrying against fresh state.
    #[must_use]
    pub fn is_business_failure(&self) -> bool {
        !matches!(self, Self::Infrastructure(_) | Self::Unexpected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_displays_bare_message() {
        let err = DomainError::validation("Organisationsnamn får inte vara tomt");
        assert_eq!(err.to_string(), "Organisationsnamn får inte vara tomt");
    }

    #[test]
    fn test_not_found_names_kind_and_id() {
        let err = DomainError::not_found("organization", &UniqueId::new("org-9"));
        assert_eq!(err.to_string(), "organization not found: org-9");
    }

    #[test]
    fn test_faults_are_not_business_failures() {
        assert!(DomainError::validation("x").is_business_failure());
        assert!(DomainError::invariant("x").is_business_failure());
        assert!(!DomainError::Infrastructure("db down".into()).is_business_failure());
        assert!(!DomainError::Unexpected("boom".into()).is_business_failure());
    }
}
