use chrono::Utc;
use quiz_core::model::{DomainId, GlobalStats, SessionStats};
use quiz_core::time::fixed_now;
use storage::repository::{StatsRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn domain(id: &str) -> DomainId {
    DomainId::new(id).unwrap()
}

fn stats_with(sessions: &[(&str, u32, u32)]) -> GlobalStats {
    let mut stats = GlobalStats::new();
    for &(domain_id, correct, total) in sessions {
        let mut session = SessionStats::start(fixed_now());
        for _ in 0..correct {
            session.record_answer(true);
        }
        for _ in correct..total {
            session.record_answer(false);
        }
        stats
            .apply_session_result(domain(domain_id), &session, total)
            .unwrap();
    }
    stats
}

#[tokio::test]
async fn sqlite_roundtrip_persists_stats_and_domains() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_stats().await.expect("load empty").is_none());

    let stats = stats_with(&[("ml-fundamentals", 8, 10), ("nlp", 10, 10)]);
    let revision = repo.save_stats(&stats, None).await.expect("save");
    assert_eq!(revision, 1);

    let snapshot = repo.load_stats().await.expect("load").expect("snapshot");
    assert_eq!(snapshot.revision, 1);
    assert_eq!(snapshot.stats, stats);
    assert_eq!(snapshot.stats.level(), stats.level());
    assert_eq!(
        snapshot
            .stats
            .domain_progress(&domain("ml-fundamentals"))
            .and_then(|p| p.best_percent()),
        Some(80)
    );
}

#[tokio::test]
async fn sqlite_save_detects_stale_revision() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_stale?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let stats = stats_with(&[("ml-fundamentals", 5, 10)]);
    repo.save_stats(&stats, None).await.expect("first save");

    let err = repo.save_stats(&stats, None).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let err = repo.save_stats(&stats, Some(9)).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let revision = repo.save_stats(&stats, Some(1)).await.expect("second save");
    assert_eq!(revision, 2);
}

#[tokio::test]
async fn sqlite_reset_clears_domain_rows() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_reset?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let stats = stats_with(&[("ml-fundamentals", 8, 10), ("computer-vision", 6, 10)]);
    repo.save_stats(&stats, None).await.expect("save");

    let revision = repo
        .save_stats(&GlobalStats::new(), Some(1))
        .await
        .expect("reset save");
    assert_eq!(revision, 2);

    let snapshot = repo.load_stats().await.expect("load").expect("snapshot");
    assert_eq!(snapshot.stats, GlobalStats::new());
    assert_eq!(snapshot.stats.domain_entries().count(), 0);
}

#[tokio::test]
async fn sqlite_load_stays_consistent_across_connections() {
    let url = "sqlite:file:memdb_two_conns?mode=memory&cache=shared";
    let writer = SqliteRepository::connect(url).await.expect("connect writer");
    writer.migrate().await.expect("migrate");
    let reader = SqliteRepository::connect(url).await.expect("connect reader");

    let first = stats_with(&[("ml-fundamentals", 8, 10)]);
    writer.save_stats(&first, None).await.expect("first save");

    let snapshot = reader.load_stats().await.expect("load").expect("snapshot");
    assert_eq!(snapshot.revision, 1);
    assert_eq!(snapshot.stats, first);

    let second = stats_with(&[("ml-fundamentals", 8, 10), ("nlp", 10, 10)]);
    writer.save_stats(&second, Some(1)).await.expect("second save");

    let snapshot = reader.load_stats().await.expect("load").expect("snapshot");
    assert_eq!(snapshot.revision, 2);
    assert_eq!(snapshot.stats, second);
    assert_eq!(snapshot.stats.domain_entries().count(), 2);
}

#[tokio::test]
async fn sqlite_load_rejects_contradictory_counters() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_invalid?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    // Bypass the repository to plant counters that violate the stats
    // invariants, then confirm the load refuses them.
    sqlx::query(
        r"
            INSERT INTO global_stats (
                id, revision, xp, total_answered, total_correct, max_streak, updated_at
            )
            VALUES (1, 1, 0, 10, 11, 0, ?1)
        ",
    )
    .bind(Utc::now())
    .execute(repo.pool())
    .await
    .expect("insert raw row");

    let err = repo.load_stats().await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn sqlite_load_rejects_best_score_without_sessions() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_orphan_best?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let stats = stats_with(&[("ml-fundamentals", 8, 10)]);
    repo.save_stats(&stats, None).await.expect("save");

    // Bypass the repository to plant a best score for a domain with no
    // finished sessions, then confirm the load refuses it.
    sqlx::query(
        r"
            INSERT INTO domain_progress (domain_id, completed, best_score)
            VALUES ('nlp', 0, 0.9)
        ",
    )
    .execute(repo.pool())
    .await
    .expect("insert raw row");

    let err = repo.load_stats().await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}
