use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("a session must contain at least one question")]
    ZeroQuestions,
    #[error("correct count {correct} exceeds question count {total}")]
    CorrectOutOfRange { correct: u32, total: u32 },
    #[error("score fraction {0} is outside 0.0..=1.0")]
    OutOfRange(f64),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DomainProgressError {
    #[error("best score recorded with zero completed sessions")]
    BestScoreWithoutSessions,
}

/// Fraction of questions answered correctly in one session, in `0.0..=1.0`.
///
/// Construction always validates, so a `Score` value is never NaN and never
/// out of range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Score(f64);

impl Score {
    /// Builds a score from raw session counts.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::ZeroQuestions`] when `total` is zero and
    /// [`ScoreError::CorrectOutOfRange`] when `correct > total`.
    pub fn from_ratio(correct: u32, total: u32) -> Result<Self, ScoreError> {
        if total == 0 {
            return Err(ScoreError::ZeroQuestions);
        }
        if correct > total {
            return Err(ScoreError::CorrectOutOfRange { correct, total });
        }
        Ok(Self(f64::from(correct) / f64::from(total)))
    }

    /// Rehydrates a score stored as a raw fraction.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::OutOfRange`] when the fraction is NaN or outside
    /// `0.0..=1.0`.
    pub fn from_fraction(fraction: f64) -> Result<Self, ScoreError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(ScoreError::OutOfRange(fraction));
        }
        Ok(Self(fraction))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Score as a whole percentage, rounded to the nearest point.
    #[must_use]
    pub fn percent(self) -> u8 {
        let pct = (self.0 * 100.0).round();
        if pct >= 100.0 { 100 } else { pct as u8 }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Lifetime progress within a single study domain.
///
/// `completed` counts finished sessions; `best_score` only ever improves, so
/// a weaker later run never erases an earlier personal best.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DomainProgress {
    completed: u32,
    best_score: Option<Score>,
}

impl DomainProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds progress from persisted counters, revalidating their pairing.
    ///
    /// # Errors
    ///
    /// Returns [`DomainProgressError::BestScoreWithoutSessions`] when a best
    /// score is stored for a domain with no finished sessions.
    pub fn from_persisted(
        completed: u32,
        best_score: Option<Score>,
    ) -> Result<Self, DomainProgressError> {
        if completed == 0 && best_score.is_some() {
            return Err(DomainProgressError::BestScoreWithoutSessions);
        }
        Ok(Self {
            completed,
            best_score,
        })
    }

    /// Folds one finished session into this domain's record.
    pub fn record_session(&mut self, score: Score) {
        self.completed = self.completed.saturating_add(1);
        self.best_score = match self.best_score {
            Some(best) if best.value() >= score.value() => Some(best),
            _ => Some(score),
        };
    }

    /// Number of sessions finished in this domain.
    #[must_use]
    pub fn completed(&self) -> u32 {
        self.completed
    }

    #[must_use]
    pub fn best_score(&self) -> Option<Score> {
        self.best_score
    }

    /// Best score as a whole percentage, `None` before the first session.
    #[must_use]
    pub fn best_percent(&self) -> Option<u8> {
        self.best_score.map(Score::percent)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
