use quiz_core::leveling;
use quiz_core::model::{DomainCatalog, DomainId, GlobalStats};

use super::engine::CompletedSession;

/// Presentation-agnostic summary for the main menu.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The UI decides how to render the XP bar and stat cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSummary {
    pub level: u32,
    pub xp: u64,
    pub xp_into_level: u64,
    pub level_xp_span: u64,
    pub progress_percent_in_level: u8,

    pub total_answered: u64,
    pub total_correct: u64,
    pub max_streak: u32,
    pub accuracy_percent: u8,
}

impl MenuSummary {
    #[must_use]
    pub fn from_stats(stats: &GlobalStats) -> Self {
        Self {
            level: stats.level(),
            xp: stats.xp(),
            xp_into_level: stats.xp_into_level(),
            level_xp_span: leveling::LEVEL_XP_SPAN,
            progress_percent_in_level: stats.progress_percent_in_level(),
            total_answered: stats.total_answered(),
            total_correct: stats.total_correct(),
            max_streak: stats.max_streak(),
            accuracy_percent: stats.accuracy_percent(),
        }
    }
}

/// One row of the domain picker, pairing catalog metadata with progress.
///
/// `completion_percent` is the best score as a percentage, zero before the
/// first finished session, matching the picker's progress bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSelectItem {
    pub domain_id: DomainId,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub gradient: String,
    pub weight: u8,

    pub completed: u32,
    pub best_percent: Option<u8>,
    pub completion_percent: u8,
}

/// Picker rows in catalog order, with zero progress for untouched domains.
#[must_use]
pub fn domain_select_items(catalog: &DomainCatalog, stats: &GlobalStats) -> Vec<DomainSelectItem> {
    catalog
        .domains()
        .iter()
        .map(|domain| {
            let progress = stats.domain_progress_or_default(domain.id());
            let best_percent = progress.best_percent();
            DomainSelectItem {
                domain_id: domain.id().clone(),
                name: domain.name().to_owned(),
                icon: domain.icon().to_owned(),
                color: domain.color().to_owned(),
                gradient: domain.gradient().to_owned(),
                weight: domain.weight(),
                completed: progress.completed(),
                best_percent,
                completion_percent: best_percent.unwrap_or(0),
            }
        })
        .collect()
}

/// Presentation-agnostic summary for the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsSummary {
    pub domain_id: DomainId,
    pub correct: u32,
    pub total_questions: u32,
    pub score_percent: u8,
    pub best_streak: u32,
    pub elapsed_seconds: u64,
    pub xp_earned: u64,

    pub level: u32,
    pub leveled_up: bool,
    pub accuracy_percent: u8,
}

impl ResultsSummary {
    #[must_use]
    pub fn from_completed(completed: &CompletedSession, stats: &GlobalStats) -> Self {
        Self {
            domain_id: completed.domain_id.clone(),
            correct: completed.session.correct(),
            total_questions: completed.total_questions,
            score_percent: completed.score.percent(),
            best_streak: completed.session.best_streak(),
            elapsed_seconds: completed.elapsed_seconds,
            xp_earned: completed.award.total(),
            level: completed.level_after,
            leveled_up: completed.leveled_up(),
            accuracy_percent: stats.accuracy_percent(),
        }
    }
}
