use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use quiz_core::model::{DomainId, GlobalStats};
use quiz_core::time::fixed_now;
use services::scoring::{MenuSummary, ResultsSummary};
use services::{Clock, ProgressError, ProgressService};
use storage::repository::{InMemoryStatsRepository, StatsRepository, StatsSnapshot, StorageError};

fn domain(id: &str) -> DomainId {
    DomainId::new(id).unwrap()
}

fn answer_rounds(svc: &mut ProgressService, correct: u32, incorrect: u32) {
    for _ in 0..correct {
        svc.answer(true).unwrap();
    }
    for _ in 0..incorrect {
        svc.answer(false).unwrap();
    }
}

#[tokio::test]
async fn finished_session_is_merged_and_persisted() {
    let repo = Arc::new(InMemoryStatsRepository::new());
    let mut svc = ProgressService::load(Clock::fixed(fixed_now()), repo.clone())
        .await
        .unwrap();

    svc.start_session(domain("ml-fundamentals")).unwrap();
    answer_rounds(&mut svc, 8, 2);
    let completed = svc.finish_session(10).await.unwrap();

    assert!(!svc.in_progress());
    assert!(!svc.is_dirty());
    assert_eq!(svc.revision(), Some(1));
    assert_eq!(completed.session.correct(), 8);
    assert_eq!(completed.score.percent(), 80);
    assert_eq!(svc.last_completed(), Some(&completed));

    let results = ResultsSummary::from_completed(&completed, svc.stats());
    assert_eq!(results.score_percent, 80);
    assert_eq!(results.accuracy_percent, 80);
    assert_eq!(results.xp_earned, 96);

    let menu = MenuSummary::from_stats(svc.stats());
    assert_eq!(menu.total_answered, 10);
    assert_eq!(menu.max_streak, 8);

    // A fresh service over the same repository sees the saved snapshot.
    let reloaded = ProgressService::load(Clock::fixed(fixed_now()), repo)
        .await
        .unwrap();
    assert_eq!(reloaded.stats(), svc.stats());
    assert_eq!(reloaded.revision(), Some(1));
    assert_eq!(
        reloaded
            .stats()
            .domain_progress(&domain("ml-fundamentals"))
            .and_then(|p| p.best_percent()),
        Some(80)
    );
}

#[tokio::test]
async fn abandoned_session_never_reaches_storage() {
    let repo = Arc::new(InMemoryStatsRepository::new());
    let mut svc = ProgressService::load(Clock::fixed(fixed_now()), repo.clone())
        .await
        .unwrap();

    svc.start_session(domain("nlp")).unwrap();
    answer_rounds(&mut svc, 3, 1);
    let dropped = svc.abandon_session().unwrap();

    assert_eq!(dropped.correct(), 3);
    assert_eq!(svc.stats(), &GlobalStats::new());
    assert!(repo.load_stats().await.unwrap().is_none());
}

#[tokio::test]
async fn reset_persists_the_cleared_snapshot() {
    let repo = Arc::new(InMemoryStatsRepository::new());
    let mut svc = ProgressService::load(Clock::fixed(fixed_now()), repo.clone())
        .await
        .unwrap();

    svc.start_session(domain("ml-fundamentals")).unwrap();
    answer_rounds(&mut svc, 10, 0);
    svc.finish_session(10).await.unwrap();
    assert!(svc.stats().xp() > 0);

    let revision = svc.reset().await.unwrap();
    assert_eq!(revision, 2);
    assert_eq!(svc.stats(), &GlobalStats::new());
    assert!(svc.last_completed().is_none());

    let snapshot = repo.load_stats().await.unwrap().unwrap();
    assert_eq!(snapshot.revision, 2);
    assert_eq!(snapshot.stats, GlobalStats::new());
}

struct FlakyRepo {
    inner: InMemoryStatsRepository,
    fail_saves: AtomicBool,
}

impl FlakyRepo {
    fn new() -> Self {
        Self {
            inner: InMemoryStatsRepository::new(),
            fail_saves: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl StatsRepository for FlakyRepo {
    async fn load_stats(&self) -> Result<Option<StatsSnapshot>, StorageError> {
        self.inner.load_stats().await
    }

    async fn save_stats(
        &self,
        stats: &GlobalStats,
        expected_revision: Option<i64>,
    ) -> Result<i64, StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("save failed".into()));
        }
        self.inner.save_stats(stats, expected_revision).await
    }
}

#[tokio::test]
async fn failed_save_keeps_the_merge_and_flush_retries() {
    let repo = Arc::new(FlakyRepo::new());
    let mut svc = ProgressService::load(Clock::fixed(fixed_now()), repo.clone())
        .await
        .unwrap();

    svc.start_session(domain("ml-fundamentals")).unwrap();
    answer_rounds(&mut svc, 7, 3);

    repo.set_failing(true);
    let err = svc.finish_session(10).await.unwrap_err();
    assert!(matches!(err, ProgressError::Storage(_)));

    // Merge survived in memory even though the save failed.
    assert!(!svc.in_progress());
    assert!(svc.is_dirty());
    assert_eq!(svc.stats().total_answered(), 10);
    assert!(repo.load_stats().await.unwrap().is_none());

    // So did the results payload for the session that just finished.
    let completed = svc.last_completed().expect("completed session retained");
    assert_eq!(completed.award.total(), 84);
    let results = ResultsSummary::from_completed(completed, svc.stats());
    assert_eq!(results.score_percent, 70);
    assert_eq!(results.xp_earned, 84);

    repo.set_failing(false);
    let revision = svc.flush().await.unwrap();
    assert_eq!(revision, Some(1));
    assert!(!svc.is_dirty());

    let snapshot = repo.load_stats().await.unwrap().unwrap();
    assert_eq!(snapshot.stats.total_correct(), 7);

    // Flushing again with nothing pending is a no-op.
    assert_eq!(svc.flush().await.unwrap(), Some(1));
}

#[tokio::test]
async fn concurrent_writer_is_detected_as_a_conflict() {
    let repo = Arc::new(InMemoryStatsRepository::new());
    let clock = Clock::fixed(fixed_now());

    let mut first = ProgressService::load(clock, repo.clone()).await.unwrap();
    let mut second = ProgressService::load(clock, repo.clone()).await.unwrap();

    first.start_session(domain("ml-fundamentals")).unwrap();
    answer_rounds(&mut first, 5, 0);
    first.finish_session(5).await.unwrap();

    second.start_session(domain("nlp")).unwrap();
    answer_rounds(&mut second, 4, 0);
    let err = second.finish_session(4).await.unwrap_err();
    assert!(matches!(
        err,
        ProgressError::Storage(StorageError::Conflict)
    ));

    // The first writer's snapshot is untouched by the losing save.
    let snapshot = repo.load_stats().await.unwrap().unwrap();
    assert_eq!(snapshot.revision, 1);
    assert_eq!(snapshot.stats.total_answered(), 5);
}
