use chrono::{DateTime, Utc};

/// Live counters for a single quiz session.
///
/// Created when a domain quiz starts, mutated on every answer event, and
/// consumed exactly once by the scoring merge at session end. Never
/// persisted; abandoning a session simply drops the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    correct: u32,
    streak: u32,
    best_streak: u32,
    started_at: DateTime<Utc>,
}

impl SessionStats {
    /// Starts tracking a new session at the given instant.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    #[must_use]
    pub fn start(started_at: DateTime<Utc>) -> Self {
        Self {
            correct: 0,
            streak: 0,
            best_streak: 0,
            started_at,
        }
    }

    /// Records one answer event.
    ///
    /// A correct answer bumps the correct count and the running streak; an
    /// incorrect answer only resets the streak.
    pub fn record_answer(&mut self, correct: bool) {
        if correct {
            self.correct = self.correct.saturating_add(1);
            self.streak = self.streak.saturating_add(1);
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
    }

    /// Elapsed whole seconds between session start and `now`, rounded to the
    /// nearest second and clamped at zero.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        let millis = (now - self.started_at).num_milliseconds().max(0);
        u64::try_from((millis + 500) / 1000).unwrap_or(0)
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    /// Current run of consecutive correct answers.
    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Highest streak observed so far in this session.
    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn starts_with_zeroed_counters() {
        let session = SessionStats::start(fixed_now());
        assert_eq!(session.correct(), 0);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.best_streak(), 0);
        assert_eq!(session.started_at(), fixed_now());
    }

    #[test]
    fn consecutive_correct_answers_build_a_streak() {
        let mut session = SessionStats::start(fixed_now());
        for _ in 0..5 {
            session.record_answer(true);
        }

        assert_eq!(session.correct(), 5);
        assert_eq!(session.streak(), 5);
        assert_eq!(session.best_streak(), 5);
    }

    #[test]
    fn incorrect_answer_resets_streak_but_keeps_best() {
        let mut session = SessionStats::start(fixed_now());
        for _ in 0..5 {
            session.record_answer(true);
        }
        session.record_answer(false);

        assert_eq!(session.correct(), 5);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.best_streak(), 5);

        session.record_answer(true);
        assert_eq!(session.streak(), 1);
        assert_eq!(session.best_streak(), 5);
    }

    #[test]
    fn elapsed_seconds_rounds_to_nearest() {
        let session = SessionStats::start(fixed_now());

        assert_eq!(
            session.elapsed_seconds(fixed_now() + Duration::milliseconds(4_400)),
            4
        );
        assert_eq!(
            session.elapsed_seconds(fixed_now() + Duration::milliseconds(4_500)),
            5
        );
    }

    #[test]
    fn elapsed_seconds_clamps_clock_skew_to_zero() {
        let session = SessionStats::start(fixed_now());
        assert_eq!(session.elapsed_seconds(fixed_now() - Duration::seconds(10)), 0);
    }
}
