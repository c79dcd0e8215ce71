use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::model::GlobalStats;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Stats as loaded from a backend, paired with the revision that save-time
/// conflict checks compare against.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub revision: i64,
    pub stats: GlobalStats,
}

impl StatsSnapshot {
    #[must_use]
    pub fn new(revision: i64, stats: GlobalStats) -> Self {
        Self { revision, stats }
    }
}

/// Repository contract for the lifetime stats aggregate.
///
/// There is exactly one stats record per store. Saves replace the whole
/// snapshot and bump a revision counter; a caller that saves against a stale
/// revision gets `Conflict` instead of silently overwriting newer data.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Load the persisted snapshot, or `None` before the first save.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be read or fails
    /// revalidation against the stats invariants.
    async fn load_stats(&self) -> Result<Option<StatsSnapshot>, StorageError>;

    /// Persist the full snapshot, replacing whatever was stored.
    ///
    /// `expected_revision` must match the revision currently on disk
    /// (`None` when no save exists yet). Returns the new revision.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` on a revision mismatch, or other
    /// storage errors if the write fails.
    async fn save_stats(
        &self,
        stats: &GlobalStats,
        expected_revision: Option<i64>,
    ) -> Result<i64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStatsRepository {
    state: Arc<Mutex<Option<StatsSnapshot>>>,
}

impl InMemoryStatsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn load_stats(&self) -> Result<Option<StatsSnapshot>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_stats(
        &self,
        stats: &GlobalStats,
        expected_revision: Option<i64>,
    ) -> Result<i64, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let current = guard.as_ref().map(|snapshot| snapshot.revision);
        if current != expected_revision {
            return Err(StorageError::Conflict);
        }
        let next = current.unwrap_or(0) + 1;
        *guard = Some(StatsSnapshot::new(next, stats.clone()));
        Ok(next)
    }
}

/// Aggregates the stats repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub stats: Arc<dyn StatsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            stats: Arc::new(InMemoryStatsRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{DomainId, SessionStats};
    use quiz_core::time::fixed_now;

    fn stats_after_one_session() -> GlobalStats {
        let mut session = SessionStats::start(fixed_now());
        for _ in 0..4 {
            session.record_answer(true);
        }
        session.record_answer(false);

        let mut stats = GlobalStats::new();
        stats
            .apply_session_result(DomainId::new("ml-fundamentals").unwrap(), &session, 5)
            .unwrap();
        stats
    }

    #[tokio::test]
    async fn round_trips_a_snapshot() {
        let repo = InMemoryStatsRepository::new();
        assert!(repo.load_stats().await.unwrap().is_none());

        let stats = stats_after_one_session();
        let revision = repo.save_stats(&stats, None).await.unwrap();
        assert_eq!(revision, 1);

        let snapshot = repo.load_stats().await.unwrap().unwrap();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.stats, stats);
    }

    #[tokio::test]
    async fn stale_revision_is_a_conflict() {
        let repo = InMemoryStatsRepository::new();
        let stats = stats_after_one_session();
        repo.save_stats(&stats, None).await.unwrap();

        let err = repo.save_stats(&stats, None).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        let err = repo.save_stats(&stats, Some(7)).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        let revision = repo.save_stats(&stats, Some(1)).await.unwrap();
        assert_eq!(revision, 2);
    }
}
