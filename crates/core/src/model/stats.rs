use std::collections::BTreeMap;

use thiserror::Error;

use crate::leveling::{self, XpAward};
use crate::model::ids::DomainId;
use crate::model::progress::{DomainProgress, Score, ScoreError};
use crate::model::session::SessionStats;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum StatsError {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("correct total {correct} exceeds answered total {answered}")]
    CorrectExceedsAnswered { correct: u64, answered: u64 },
    #[error("max streak {streak} exceeds answered total {answered}")]
    StreakExceedsAnswered { streak: u32, answered: u64 },
}

/// Durable lifetime statistics across every domain.
///
/// This is the single aggregate the scoring engine merges finished sessions
/// into. `level` is always derived from `xp`, never stored independently, so
/// the two cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalStats {
    xp: u64,
    level: u32,
    total_answered: u64,
    total_correct: u64,
    max_streak: u32,
    domains: BTreeMap<DomainId, DomainProgress>,
}

impl Default for GlobalStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalStats {
    /// Fresh stats for a player who has never finished a session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            xp: 0,
            level: leveling::level_for_xp(0),
            total_answered: 0,
            total_correct: 0,
            max_streak: 0,
            domains: BTreeMap::new(),
        }
    }

    /// Rebuilds stats from persisted counters, revalidating the cross-field
    /// invariants and rederiving the level from XP.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::CorrectExceedsAnswered`] or
    /// [`StatsError::StreakExceedsAnswered`] when the stored counters
    /// contradict each other.
    pub fn from_persisted(
        xp: u64,
        total_answered: u64,
        total_correct: u64,
        max_streak: u32,
        domains: BTreeMap<DomainId, DomainProgress>,
    ) -> Result<Self, StatsError> {
        if total_correct > total_answered {
            return Err(StatsError::CorrectExceedsAnswered {
                correct: total_correct,
                answered: total_answered,
            });
        }
        if u64::from(max_streak) > total_answered {
            return Err(StatsError::StreakExceedsAnswered {
                streak: max_streak,
                answered: total_answered,
            });
        }
        Ok(Self {
            xp,
            level: leveling::level_for_xp(xp),
            total_answered,
            total_correct,
            max_streak,
            domains,
        })
    }

    /// Merges one finished session into the lifetime record.
    ///
    /// Validation happens before any field is touched, so a rejected session
    /// leaves the stats exactly as they were. On success every affected
    /// counter is updated together and the earned XP award is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::ZeroQuestions`] for an empty session and
    /// [`ScoreError::CorrectOutOfRange`] when the session claims more correct
    /// answers than it had questions.
    pub fn apply_session_result(
        &mut self,
        domain_id: DomainId,
        session: &SessionStats,
        total_questions: u32,
    ) -> Result<XpAward, StatsError> {
        let score = Score::from_ratio(session.correct(), total_questions)?;
        let award = XpAward::for_session(session.correct(), total_questions, session.best_streak());

        self.total_answered = self
            .total_answered
            .saturating_add(u64::from(total_questions));
        self.total_correct = self.total_correct.saturating_add(u64::from(session.correct()));
        self.max_streak = self.max_streak.max(session.best_streak());
        self.xp = self.xp.saturating_add(award.total());
        self.level = leveling::level_for_xp(self.xp);
        self.domains
            .entry(domain_id)
            .or_default()
            .record_session(score);

        Ok(award)
    }

    /// Wipes all lifetime progress back to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Lifetime accuracy as a whole percentage, zero before any answer.
    #[must_use]
    pub fn accuracy_percent(&self) -> u8 {
        if self.total_answered == 0 {
            return 0;
        }
        let pct = (self.total_correct as f64 / self.total_answered as f64 * 100.0).round();
        if pct >= 100.0 { 100 } else { pct as u8 }
    }

    #[must_use]
    pub fn xp(&self) -> u64 {
        self.xp
    }

    /// Current level, always `level_for_xp(self.xp())`.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// XP accumulated inside the current level, for "x / 100 XP" displays.
    #[must_use]
    pub fn xp_into_level(&self) -> u64 {
        leveling::xp_into_level(self.xp)
    }

    /// Percentage of the current level already earned.
    #[must_use]
    pub fn progress_percent_in_level(&self) -> u8 {
        leveling::progress_percent_in_level(self.xp)
    }

    #[must_use]
    pub fn total_answered(&self) -> u64 {
        self.total_answered
    }

    #[must_use]
    pub fn total_correct(&self) -> u64 {
        self.total_correct
    }

    /// Longest streak ever reached in any single session.
    #[must_use]
    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    /// Progress for one domain, `None` until a session finishes there.
    #[must_use]
    pub fn domain_progress(&self, domain_id: &DomainId) -> Option<&DomainProgress> {
        self.domains.get(domain_id)
    }

    /// Progress for one domain, or the zero value when none is recorded yet.
    #[must_use]
    pub fn domain_progress_or_default(&self, domain_id: &DomainId) -> DomainProgress {
        self.domains.get(domain_id).copied().unwrap_or_default()
    }

    /// All per-domain progress entries in stable id order.
    pub fn domain_entries(&self) -> impl Iterator<Item = (&DomainId, &DomainProgress)> {
        self.domains.iter()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
