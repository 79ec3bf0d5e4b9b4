//! Identity value shared by every entity and aggregate.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque string identifier for an entity or aggregate.
///
/// Identifiers are normally supplied by the persistence layer, so no
/// validation happens here beyond the non-empty precondition, which is
/// checked in debug builds only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueId(String);

impl UniqueId {
    /// Wraps a raw identifier, or re-wraps an existing `UniqueId`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the identifier is empty.
    #[must_use]
    pub fn new(source: impl Into<Self>) -> Self {
        let id = source.into();
        debug_assert!(!id.0.is_empty(), "UniqueId must not be empty");
        id
    }

    /// Generates a fresh, time-ordered identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Structural equality, spelled out for call sites that read better
    /// with a method.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UniqueId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for UniqueId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Uuid> for UniqueId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl From<&UniqueId> for UniqueId {
    fn from(value: &UniqueId) -> Self {
        value.clone()
    }
}

impl AsRef<str> for UniqueId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
