use std::sync::Arc;

use chrono::{DateTime, Utc};

use quiz_core::model::{DomainId, GlobalStats, SessionStats};
use storage::repository::{StatsRepository, Storage};

use super::engine::{CompletedSession, ScoringEngine};
use crate::Clock;
use crate::error::ProgressError;

/// Orchestrates the scoring engine against durable storage.
///
/// This service owns:
/// - the time source (`Clock`)
/// - repository access
/// - the load-at-startup / save-after-finish checkpoints
///
/// The engine itself stays synchronous and storage-free; this layer stamps
/// timestamps and persists the stats snapshot after every merge or reset. A
/// failed save keeps the merged stats in memory and marks them dirty so
/// [`flush`](Self::flush) can retry.
pub struct ProgressService {
    clock: Clock,
    stats_repo: Arc<dyn StatsRepository>,
    engine: ScoringEngine,
    revision: Option<i64>,
    dirty: bool,
    last_completed: Option<CompletedSession>,
}

impl ProgressService {
    /// Build the service by loading persisted stats from the repository.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` when the snapshot cannot be loaded
    /// or fails revalidation.
    pub async fn load(
        clock: Clock,
        stats_repo: Arc<dyn StatsRepository>,
    ) -> Result<Self, ProgressError> {
        let (revision, engine) = match stats_repo.load_stats().await? {
            Some(snapshot) => (
                Some(snapshot.revision),
                ScoringEngine::with_stats(snapshot.stats),
            ),
            None => (None, ScoringEngine::new()),
        };
        Ok(Self {
            clock,
            stats_repo,
            engine,
            revision,
            dirty: false,
            last_completed: None,
        })
    }

    /// Fresh service backed by an in-memory repository.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self {
            clock,
            stats_repo: Storage::in_memory().stats,
            engine: ScoringEngine::new(),
            revision: None,
            dirty: false,
            last_completed: None,
        }
    }

    /// Build the service on top of a `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Sqlite` when the database cannot be opened or
    /// migrated, and `ProgressError::Storage` when loading the snapshot fails.
    pub async fn sqlite(clock: Clock, database_url: &str) -> Result<Self, ProgressError> {
        let storage = Storage::sqlite(database_url).await?;
        Self::load(clock, storage.stats).await
    }

    /// Begin a session for the given domain at the current clock time.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Engine` when a session is already running.
    pub fn start_session(&mut self, domain_id: DomainId) -> Result<(), ProgressError> {
        let now = self.clock.now();
        Ok(self.engine.start_session(domain_id, now)?)
    }

    /// Record one answer in the running session.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Engine` when no session is running.
    pub fn answer(&mut self, correct: bool) -> Result<&SessionStats, ProgressError> {
        Ok(self.engine.record_answer(correct)?)
    }

    /// Finish the running session, merge it into the stats, and persist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Engine` when the session cannot be finished;
    /// in that case nothing changes. Returns `ProgressError::Storage` when
    /// the save fails; the merge is kept in memory and marked dirty for
    /// [`flush`](Self::flush), and the completed session stays readable via
    /// [`last_completed`](Self::last_completed).
    pub async fn finish_session(
        &mut self,
        total_questions: u32,
    ) -> Result<CompletedSession, ProgressError> {
        let now = self.clock.now();
        let completed = self.engine.finish_session(total_questions, now)?;
        self.last_completed = Some(completed.clone());
        self.dirty = true;
        self.persist().await?;
        Ok(completed)
    }

    /// Drop the running session without merging it, if one exists.
    ///
    /// Nothing is persisted; an abandoned session never reaches the stats.
    pub fn abandon_session(&mut self) -> Option<SessionStats> {
        self.engine.abandon_session()
    }

    /// Wipe all progress, discard any running session, and persist the
    /// cleared snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` when the save fails; the cleared
    /// stats are kept in memory and marked dirty for [`flush`](Self::flush).
    pub async fn reset(&mut self) -> Result<i64, ProgressError> {
        self.engine.reset();
        self.last_completed = None;
        self.dirty = true;
        self.persist().await
    }

    /// Retry persisting the stats after a failed save.
    ///
    /// Returns the current revision, unchanged when there was nothing to
    /// write.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` when the save fails again.
    pub async fn flush(&mut self) -> Result<Option<i64>, ProgressError> {
        if !self.dirty {
            return Ok(self.revision);
        }
        let revision = self.persist().await?;
        Ok(Some(revision))
    }

    async fn persist(&mut self) -> Result<i64, ProgressError> {
        let revision = self
            .stats_repo
            .save_stats(self.engine.stats(), self.revision)
            .await?;
        self.revision = Some(revision);
        self.dirty = false;
        Ok(revision)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn stats(&self) -> &GlobalStats {
        self.engine.stats()
    }

    /// Tracker for the running session, `None` when idle.
    #[must_use]
    pub fn session(&self) -> Option<&SessionStats> {
        self.engine.session()
    }

    /// Domain of the running session, `None` when idle.
    #[must_use]
    pub fn active_domain(&self) -> Option<&DomainId> {
        self.engine.active_domain()
    }

    /// Most recently finished session, retained even when its save failed.
    ///
    /// Lets the host still render a results screen after a storage error and
    /// retry the save with [`flush`](Self::flush). Cleared by
    /// [`reset`](Self::reset).
    #[must_use]
    pub fn last_completed(&self) -> Option<&CompletedSession> {
        self.last_completed.as_ref()
    }

    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.engine.in_progress()
    }

    /// True when the in-memory stats are ahead of the persisted snapshot.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Revision of the last successful save, `None` before the first one.
    #[must_use]
    pub fn revision(&self) -> Option<i64> {
        self.revision
    }
}
