//! Repository abstraction.
//!
//! Implementations live outside the core. They must not write partially on
//! failure, must translate storage errors into `DomainError`, and are
//! responsible for rejecting conflicting writes: `save` compares the stored
//! version with [`AggregateRoot::version`] and fails with
//! `DomainError::ConcurrencyConflict` on mismatch. A successful save
//! advances the stored version by exactly one.

use async_trait::async_trait;

use crate::aggregate::AggregateRoot;
use crate::error::DomainError;
use crate::id::UniqueId;
use crate::result::DomainResult;

/// Loads and persists aggregates of type `T`.
#[async_trait]
pub trait Repository<T: AggregateRoot>: Send + Sync {
    /// Loads the aggregate with the given id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no aggregate has that id, or
    /// `DomainError::Infrastructure` if storage fails.
    async fn find_by_id(&self, id: &UniqueId) -> DomainResult<T>;

    /// Persists the aggregate's current state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` if the stored version is
    /// not the one the aggregate was loaded at, or
    /// `DomainError::Infrastructure` if storage fails.
    async fn save(&self, aggregate: &T) -> DomainResult<()>;

    /// Returns whether an aggregate with the given id exists.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if storage fails.
    async fn exists(&self, id: &UniqueId) -> DomainResult<bool> {
        match self.find_by_id(id).await {
            Ok(_) => Ok(true),
            Err(DomainError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
