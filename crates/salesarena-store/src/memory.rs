//! In-memory implementation of the `Repository` trait.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use salesarena_core::aggregate::AggregateRoot;
use salesarena_core::error::DomainError;
use salesarena_core::id::UniqueId;
use salesarena_core::repository::Repository;
use salesarena_core::result::{DomainResult, OptionExt};
use tracing::{debug, warn};

/// Versioned in-memory repository.
///
/// Each stored aggregate carries the version it was saved at. `save` is a
/// compare-and-swap on that version, so two writers that loaded the same
/// version cannot both succeed.
pub struct InMemoryRepository<T> {
    rows: Arc<RwLock<HashMap<UniqueId, T>>>,
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T> fmt::Debug for InMemoryRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("InMemoryRepository")
            .field("rows", &rows.len())
            .finish()
    }
}

impl<T> InMemoryRepository<T>
where
    T: AggregateRoot + Clone,
{
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored aggregates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// `true` when nothing has been saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns copies of every stored aggregate matching `predicate`,
    /// ordered by id.
    pub fn find_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<T> = rows.values().filter(|row| predicate(row)).cloned().collect();
        found.sort_by(|a, b| a.id().cmp(b.id()));
        found
    }
}

#[async_trait]
impl<T> Repository<T> for InMemoryRepository<T>
where
    T: AggregateRoot + Clone,
{
    async fn find_by_id(&self, id: &UniqueId) -> DomainResult<T> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        rows.get(id).cloned().or_not_found(T::KIND, id)
    }

    async fn save(&self, aggregate: &T) -> DomainResult<()> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let stored_version = rows.get(aggregate.id()).map_or(0, |row| row.version());

        if stored_version != aggregate.version() {
            warn!(
                kind = T::KIND,
                aggregate_id = %aggregate.id(),
                expected = aggregate.version(),
                actual = stored_version,
                "rejected stale write"
            );
            return Err(DomainError::ConcurrencyConflict {
                id: aggregate.id().clone(),
                expected: aggregate.version(),
                actual: stored_version,
            });
        }

        let mut row = aggregate.clone();
        row.clear_events();
        row.set_version(stored_version + 1);
        rows.insert(aggregate.id().clone(), row);

        debug!(
            kind = T::KIND,
            aggregate_id = %aggregate.id(),
            version = stored_version + 1,
            "saved aggregate"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use salesarena_core::event::{DomainEvent, EventMetadata};
    use uuid::Uuid;

    use super::*;

    #[derive(Debug, Clone)]
    struct Noted {
        metadata: EventMetadata,
    }

    impl DomainEvent for Noted {
        fn event_type(&self) -> &'static str {
            "note.written"
        }

        fn to_payload(&self) -> serde_json::Value {
            serde_json::Value::Null
        }

        fn metadata(&self) -> &EventMetadata {
            &self.metadata
        }
    }

    #[derive(Debug, Clone)]
    struct Note {
        id: UniqueId,
        version: u64,
        text: String,
        pending: Vec<Noted>,
    }

    impl Note {
        fn written(id: &str, text: &str) -> Self {
            let id = UniqueId::new(id);
            let event = Noted {
                metadata: EventMetadata {
                    event_id: Uuid::new_v4(),
                    event_type: "note.written".to_owned(),
                    aggregate_id: id.clone(),
                    correlation_id: Uuid::nil(),
                    occurred_at: Utc::now(),
                },
            };
            Self {
                id,
                version: 0,
                text: text.to_owned(),
                pending: vec![event],
            }
        }
    }

    impl AggregateRoot for Note {
        type Event = Noted;
        const KIND: &'static str = "note";

        fn id(&self) -> &UniqueId {
            &self.id
        }

        fn version(&self) -> u64 {
            self.version
        }

        fn set_version(&mut self, version: u64) {
            self.version = version;
        }

        fn validate_invariants(&self) -> DomainResult<()> {
            Ok(())
        }

        fn pending_events(&self) -> &[Noted] {
            &self.pending
        }

        fn pull_domain_events(&mut self) -> Vec<Noted> {
            std::mem::take(&mut self.pending)
        }
    }

    #[tokio::test]
    async fn test_saved_aggregate_is_found_with_next_version_and_no_events() {
        // Arrange
        let repo = InMemoryRepository::new();
        let note = Note::written("n-1", "call the lead");

        // Act
        repo.save(&note).await.unwrap();
        let loaded = repo.find_by_id(&UniqueId::new("n-1")).await.unwrap();

        // Assert
        assert_eq!(loaded.text, "call the lead");
        assert_eq!(loaded.version(), 1);
        assert!(loaded.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_missing_aggregate_is_not_found() {
        let repo: InMemoryRepository<Note> = InMemoryRepository::new();

        let result = repo.find_by_id(&UniqueId::new("ghost")).await;

        assert_eq!(
            result.unwrap_err(),
            DomainError::not_found("note", &UniqueId::new("ghost"))
        );
    }

    #[tokio::test]
    async fn test_stale_write_is_rejected_and_store_unchanged() {
        // Arrange: two writers load the same version.
        let repo = InMemoryRepository::new();
        repo.save(&Note::written("n-1", "draft")).await.unwrap();
        let mut first = repo.find_by_id(&UniqueId::new("n-1")).await.unwrap();
        let mut second = first.clone();
        first.text = "first wins".to_owned();
        second.text = "second loses".to_owned();

        // Act
        repo.save(&first).await.unwrap();
        let result = repo.save(&second).await;

        // Assert
        assert_eq!(
            result,
            Err(DomainError::ConcurrencyConflict {
                id: UniqueId::new("n-1"),
                expected: 1,
                actual: 2,
            })
        );
        let stored = repo.find_by_id(&UniqueId::new("n-1")).await.unwrap();
        assert_eq!(stored.text, "first wins");
        assert_eq!(stored.version(), 2);
    }

    #[tokio::test]
    async fn test_creating_an_existing_id_conflicts() {
        let repo = InMemoryRepository::new();
        repo.save(&Note::written("n-1", "one")).await.unwrap();

        let result = repo.save(&Note::written("n-1", "two")).await;

        assert!(matches!(
            result,
            Err(DomainError::ConcurrencyConflict { expected: 0, actual: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_find_where_filters_and_orders_by_id() {
        let repo = InMemoryRepository::new();
        repo.save(&Note::written("n-2", "keep")).await.unwrap();
        repo.save(&Note::written("n-1", "keep")).await.unwrap();
        repo.save(&Note::written("n-3", "drop")).await.unwrap();

        let found = repo.find_where(|note| note.text == "keep");

        let ids: Vec<&str> = found.iter().map(|note| note.id().as_str()).collect();
        assert_eq!(ids, vec!["n-1", "n-2"]);
        assert_eq!(repo.len(), 3);
    }
}
