use quiz_core::model::{HighScoreEntry, SessionSummary};

use super::{
    SqliteRepository,
    mapping::{difficulty_to_str, map_high_score_row, map_session_log_row},
};
use crate::repository::{SessionRecorder, StorageError};

#[async_trait::async_trait]
impl SessionRecorder for SqliteRepository {
    async fn append_log(&self, summary: &SessionSummary) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO session_logs (
                    player, category, difficulty, quota,
                    correct, wrong, skipped, score, started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(summary.player())
        .bind(summary.category().key())
        .bind(difficulty_to_str(summary.difficulty()))
        .bind(i64::from(summary.quota()))
        .bind(i64::from(summary.correct()))
        .bind(i64::from(summary.wrong()))
        .bind(i64::from(summary.skipped()))
        .bind(i64::from(summary.score()))
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn append_high_score(&self, entry: &HighScoreEntry) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO high_scores (player, score, category, difficulty, recorded_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(&entry.player)
        .bind(i64::from(entry.score))
        .bind(entry.category.key())
        .bind(difficulty_to_str(entry.difficulty))
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<HighScoreEntry>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT player, score, category, difficulty, recorded_at
                FROM high_scores
                ORDER BY score DESC, recorded_at ASC, id ASC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_high_score_row(&row)?);
        }
        Ok(out)
    }

    async fn recent_logs(&self, limit: u32) -> Result<Vec<SessionSummary>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    player, category, difficulty, quota,
                    correct, wrong, skipped, score, started_at, completed_at
                FROM session_logs
                ORDER BY completed_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_session_log_row(&row)?);
        }
        Ok(out)
    }
}
