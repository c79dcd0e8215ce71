use chrono::{DateTime, Utc};

use quiz_core::leveling::XpAward;
use quiz_core::model::{DomainId, GlobalStats, Score, SessionStats, StatsError};

use crate::error::EngineError;

//
// ─── COMPLETED SESSION ─────────────────────────────────────────────────────────
//

/// Everything a results screen needs about one finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSession {
    pub domain_id: DomainId,
    pub session: SessionStats,
    pub total_questions: u32,
    pub score: Score,
    pub award: XpAward,
    pub elapsed_seconds: u64,
    pub level_before: u32,
    pub level_after: u32,
}

impl CompletedSession {
    #[must_use]
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

//
// ─── SCORING ENGINE ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
struct ActiveSession {
    domain_id: DomainId,
    session: SessionStats,
}

/// State machine over a session's lifecycle.
///
/// Holds the lifetime stats plus at most one in-progress session. Answer
/// events mutate only the session tracker; the stats change in exactly one
/// place, the merge inside [`finish_session`](Self::finish_session).
pub struct ScoringEngine {
    stats: GlobalStats,
    active: Option<ActiveSession>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    /// Engine with all-zero stats, for a first launch.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stats(GlobalStats::new())
    }

    /// Engine resuming from previously loaded stats.
    #[must_use]
    pub fn with_stats(stats: GlobalStats) -> Self {
        Self {
            stats,
            active: None,
        }
    }

    /// Begin a session for the given domain.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SessionInProgress` when a session is already
    /// running; the running session is left untouched.
    pub fn start_session(
        &mut self,
        domain_id: DomainId,
        started_at: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if self.active.is_some() {
            return Err(EngineError::SessionInProgress);
        }
        self.active = Some(ActiveSession {
            domain_id,
            session: SessionStats::start(started_at),
        });
        Ok(())
    }

    /// Record one answer in the running session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoActiveSession` when idle.
    pub fn record_answer(&mut self, correct: bool) -> Result<&SessionStats, EngineError> {
        let active = self.active.as_mut().ok_or(EngineError::NoActiveSession)?;
        active.session.record_answer(correct);
        Ok(&active.session)
    }

    /// Finish the running session and merge it into the lifetime stats.
    ///
    /// On success the engine returns to idle and hands back the completed
    /// session along with its XP award and level movement.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoActiveSession` when idle, or a validation
    /// error when `total_questions` cannot account for the answers recorded.
    /// Any error leaves the session in progress and the stats unchanged.
    pub fn finish_session(
        &mut self,
        total_questions: u32,
        finished_at: DateTime<Utc>,
    ) -> Result<CompletedSession, EngineError> {
        let Some(active) = self.active.as_ref() else {
            return Err(EngineError::NoActiveSession);
        };
        let score = Score::from_ratio(active.session.correct(), total_questions)
            .map_err(StatsError::from)?;

        let level_before = self.stats.level();
        let domain_id = active.domain_id.clone();
        let session = active.session.clone();
        let award = self
            .stats
            .apply_session_result(domain_id.clone(), &session, total_questions)?;
        self.active = None;

        Ok(CompletedSession {
            domain_id,
            elapsed_seconds: session.elapsed_seconds(finished_at),
            session,
            total_questions,
            score,
            award,
            level_before,
            level_after: self.stats.level(),
        })
    }

    /// Drop the running session without merging it, if one exists.
    ///
    /// An abandoned session contributes nothing to the lifetime stats.
    pub fn abandon_session(&mut self) -> Option<SessionStats> {
        self.active.take().map(|active| active.session)
    }

    /// Wipe the lifetime stats and discard any running session.
    pub fn reset(&mut self) {
        self.active = None;
        self.stats.reset();
    }

    #[must_use]
    pub fn stats(&self) -> &GlobalStats {
        &self.stats
    }

    /// Tracker for the running session, `None` when idle.
    #[must_use]
    pub fn session(&self) -> Option<&SessionStats> {
        self.active.as_ref().map(|active| &active.session)
    }

    /// Domain of the running session, `None` when idle.
    #[must_use]
    pub fn active_domain(&self) -> Option<&DomainId> {
        self.active.as_ref().map(|active| &active.domain_id)
    }

    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.active.is_some()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
