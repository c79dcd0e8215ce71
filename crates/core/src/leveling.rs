//! XP leveling curve and per-session award policy.
//!
//! Levels sit on a flat threshold curve of [`LEVEL_XP_SPAN`] XP each, so the
//! host can render "Level N" next to an "x / 100 XP" bar without extra math.
//! The award policy pays a fixed amount per correct answer, a bonus scaled by
//! the session's best streak, and a flat bonus for a flawless session; both
//! the curve and the policy are deterministic and monotonic.

/// XP span of a single level.
pub const LEVEL_XP_SPAN: u64 = 100;

/// XP paid per correctly answered question.
pub const XP_PER_CORRECT: u64 = 10;

/// XP paid per unit of the session's best streak.
pub const XP_PER_STREAK: u64 = 2;

/// Flat XP bonus for answering every question in a session correctly.
pub const PERFECT_SESSION_BONUS: u64 = 25;

/// Level reached at a cumulative XP total. Levels start at 1 for zero XP.
///
/// Total over all of `u64`, saturating at `u32::MAX` for totals beyond the
/// representable level range. Monotonic: more XP never yields a lower level.
#[must_use]
pub fn level_for_xp(xp: u64) -> u32 {
    u32::try_from(xp / LEVEL_XP_SPAN + 1).unwrap_or(u32::MAX)
}

/// XP accumulated inside the current level, in `0..LEVEL_XP_SPAN`.
#[must_use]
pub fn xp_into_level(xp: u64) -> u64 {
    xp % LEVEL_XP_SPAN
}

/// Integer percentage through the current level, clamped to `0..=100`.
#[must_use]
pub fn progress_percent_in_level(xp: u64) -> u8 {
    let percent = (xp_into_level(xp) * 100 / LEVEL_XP_SPAN).min(100);
    u8::try_from(percent).unwrap_or(100)
}

//
// ─── XP AWARD ──────────────────────────────────────────────────────────────────
//

/// Itemized XP awarded for one completed session.
///
/// Kept itemized so a results screen can show the breakdown; the aggregate
/// only ever consumes [`XpAward::total`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    base: u64,
    streak_bonus: u64,
    perfect_bonus: u64,
}

impl XpAward {
    /// Computes the award for a finished session.
    ///
    /// Monotonic in `correct` (for a fixed `total_questions`) and in
    /// `best_streak`; always non-negative. Callers validate that
    /// `correct <= total_questions` and `total_questions > 0` before
    /// crediting the award.
    #[must_use]
    pub fn for_session(correct: u32, total_questions: u32, best_streak: u32) -> Self {
        let perfect = total_questions > 0 && correct == total_questions;
        Self {
            base: u64::from(correct) * XP_PER_CORRECT,
            streak_bonus: u64::from(best_streak) * XP_PER_STREAK,
            perfect_bonus: if perfect { PERFECT_SESSION_BONUS } else { 0 },
        }
    }

    #[must_use]
    pub fn base(&self) -> u64 {
        self.base
    }

    #[must_use]
    pub fn streak_bonus(&self) -> u64 {
        self.streak_bonus
    }

    #[must_use]
    pub fn perfect_bonus(&self) -> u64 {
        self.perfect_bonus
    }

    /// Sum of all award components.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.base + self.streak_bonus + self.perfect_bonus
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
