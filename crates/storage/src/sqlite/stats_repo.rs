use std::collections::BTreeMap;

use chrono::Utc;
use quiz_core::model::{DomainId, DomainProgress, GlobalStats, Score};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{StatsRepository, StatsSnapshot, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn count_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn map_domain_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(DomainId, DomainProgress), StorageError> {
    let raw_id: String = row.try_get("domain_id").map_err(ser)?;
    let domain_id = DomainId::new(raw_id).map_err(ser)?;
    let completed = u32_from_i64("completed", row.try_get::<i64, _>("completed").map_err(ser)?)?;
    let best_score = row
        .try_get::<Option<f64>, _>("best_score")
        .map_err(ser)?
        .map(Score::from_fraction)
        .transpose()
        .map_err(ser)?;

    let progress = DomainProgress::from_persisted(completed, best_score).map_err(ser)?;
    Ok((domain_id, progress))
}

#[async_trait::async_trait]
impl StatsRepository for SqliteRepository {
    async fn load_stats(&self) -> Result<Option<StatsSnapshot>, StorageError> {
        // Both reads run in one transaction so the stats row and its domain
        // rows come from the same snapshot.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = sqlx::query(
            r"
                SELECT revision, xp, total_answered, total_correct, max_streak
                FROM global_stats
                WHERE id = 1
            ",
        )
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        else {
            tx.commit()
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            return Ok(None);
        };

        let revision: i64 = row.try_get("revision").map_err(ser)?;
        let xp = u64_from_i64("xp", row.try_get::<i64, _>("xp").map_err(ser)?)?;
        let total_answered = u64_from_i64(
            "total_answered",
            row.try_get::<i64, _>("total_answered").map_err(ser)?,
        )?;
        let total_correct = u64_from_i64(
            "total_correct",
            row.try_get::<i64, _>("total_correct").map_err(ser)?,
        )?;
        let max_streak =
            u32_from_i64("max_streak", row.try_get::<i64, _>("max_streak").map_err(ser)?)?;

        let domain_rows = sqlx::query(
            r"
                SELECT domain_id, completed, best_score
                FROM domain_progress
                ORDER BY domain_id ASC
            ",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut domains = BTreeMap::new();
        for row in &domain_rows {
            let (domain_id, progress) = map_domain_row(row)?;
            domains.insert(domain_id, progress);
        }

        let stats =
            GlobalStats::from_persisted(xp, total_answered, total_correct, max_streak, domains)
                .map_err(ser)?;

        Ok(Some(StatsSnapshot::new(revision, stats)))
    }

    async fn save_stats(
        &self,
        stats: &GlobalStats,
        expected_revision: Option<i64>,
    ) -> Result<i64, StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let current: Option<i64> = sqlx::query("SELECT revision FROM global_stats WHERE id = 1")
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .map(|row| row.try_get("revision"))
            .transpose()
            .map_err(ser)?;

        if current != expected_revision {
            return Err(StorageError::Conflict);
        }
        let next = current.unwrap_or(0) + 1;

        sqlx::query(
            r"
                INSERT INTO global_stats (
                    id, revision, xp, total_answered, total_correct, max_streak, updated_at
                )
                VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    revision = excluded.revision,
                    xp = excluded.xp,
                    total_answered = excluded.total_answered,
                    total_correct = excluded.total_correct,
                    max_streak = excluded.max_streak,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(next)
        .bind(count_i64("xp", stats.xp())?)
        .bind(count_i64("total_answered", stats.total_answered())?)
        .bind(count_i64("total_correct", stats.total_correct())?)
        .bind(i64::from(stats.max_streak()))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        // Domain rows are replaced wholesale so deletions (reset) propagate.
        sqlx::query("DELETE FROM domain_progress")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (domain_id, progress) in stats.domain_entries() {
            sqlx::query(
                r"
                    INSERT INTO domain_progress (domain_id, completed, best_score)
                    VALUES (?1, ?2, ?3)
                ",
            )
            .bind(domain_id.as_str())
            .bind(i64::from(progress.completed()))
            .bind(progress.best_score().map(Score::value))
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(next)
    }
}
