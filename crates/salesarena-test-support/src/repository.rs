//! Test repositories — `Repository` implementations for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use salesarena_core::aggregate::AggregateRoot;
use salesarena_core::error::DomainError;
use salesarena_core::id::UniqueId;
use salesarena_core::repository::Repository;
use salesarena_core::result::DomainResult;
use salesarena_store::InMemoryRepository;

/// An in-memory repository that counts `find_by_id` and `save` calls and
/// can be switched into failing saves.
#[derive(Debug)]
pub struct CountingRepository<T> {
    inner: InMemoryRepository<T>,
    finds: AtomicUsize,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl<T: AggregateRoot + Clone> Default for CountingRepository<T> {
    fn default() -> Self {
        Self {
            inner: InMemoryRepository::new(),
            finds: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }
}

impl<T: AggregateRoot + Clone> CountingRepository<T> {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `aggregate`, without counting
    /// the seeding save.
    ///
    /// # Errors
    ///
    /// Returns the inner repository's error if seeding fails.
    pub async fn seeded(aggregate: &T) -> DomainResult<Self> {
        let repo = Self::new();
        repo.inner.save(aggregate).await?;
        Ok(repo)
    }

    /// Makes every later `save` fail with an infrastructure error.
    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    /// Number of `find_by_id` calls so far.
    #[must_use]
    pub fn find_calls(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    /// Number of `save` calls so far, failed ones included.
    #[must_use]
    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Total repository calls.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.find_calls() + self.save_calls()
    }

    /// The wrapped store, for query helpers and direct inspection.
    #[must_use]
    pub fn store(&self) -> &InMemoryRepository<T> {
        &self.inner
    }
}

#[async_trait]
impl<T: AggregateRoot + Clone> Repository<T> for CountingRepository<T> {
    async fn find_by_id(&self, id: &UniqueId) -> DomainResult<T> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn save(&self, aggregate: &T) -> DomainResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure("connection refused".into()));
        }
        self.inner.save(aggregate).await
    }
}

/// A repository whose every call returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingRepository;

#[async_trait]
impl<T: AggregateRoot> Repository<T> for FailingRepository {
    async fn find_by_id(&self, _id: &UniqueId) -> DomainResult<T> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save(&self, _aggregate: &T) -> DomainResult<()> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A repository that panics on every call, standing in for an adapter
/// with a defect.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanickingRepository;

#[async_trait]
impl<T: AggregateRoot> Repository<T> for PanickingRepository {
    async fn find_by_id(&self, _id: &UniqueId) -> DomainResult<T> {
        panic!("driver returned a malformed row")
    }

    async fn save(&self, _aggregate: &T) -> DomainResult<()> {
        panic!("driver returned a malformed row")
    }
}
