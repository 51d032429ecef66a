use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Category, Difficulty, SessionStats};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("player name cannot be empty")]
    EmptyPlayer,

    #[error("resolved questions ({sum}) exceed the quota ({quota})")]
    CountMismatch { quota: u32, sum: u32 },
}

/// Log entry for a finished quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    player: String,
    category: Category,
    difficulty: Difficulty,
    quota: u32,
    correct: u32,
    wrong: u32,
    skipped: u32,
    score: i32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Rehydrate a summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if the time range or counts are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        player: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
        quota: u32,
        correct: u32,
        wrong: u32,
        skipped: u32,
        score: i32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        let player = player.into();
        if player.trim().is_empty() {
            return Err(SessionSummaryError::EmptyPlayer);
        }
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        // Overflow counts as a mismatch.
        let sum = correct
            .checked_add(wrong)
            .and_then(|s| s.checked_add(skipped))
            .unwrap_or(u32::MAX);
        if sum > quota {
            return Err(SessionSummaryError::CountMismatch { quota, sum });
        }

        Ok(Self {
            player,
            category,
            difficulty,
            quota,
            correct,
            wrong,
            skipped,
            score,
            started_at,
            completed_at,
        })
    }

    /// Build a summary from final session stats.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if the time range or counts are inconsistent.
    pub fn from_stats(
        player: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
        quota: u32,
        stats: &SessionStats,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        Self::from_persisted(
            player,
            category,
            difficulty,
            quota,
            stats.correct(),
            stats.wrong(),
            stats.skipped(),
            stats.score(),
            started_at,
            completed_at,
        )
    }

    #[must_use]
    pub fn player(&self) -> &str {
        &self.player
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn quota(&self) -> u32 {
        self.quota
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub player: String,
    pub score: i32,
    pub category: Category,
    pub difficulty: Difficulty,
    pub recorded_at: DateTime<Utc>,
}

impl From<&SessionSummary> for HighScoreEntry {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            player: summary.player().to_owned(),
            score: summary.score(),
            category: summary.category(),
            difficulty: summary.difficulty(),
            recorded_at: summary.completed_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_reversed_time_range() {
        let now = fixed_now();
        let err = SessionSummary::from_persisted(
            "ana",
            Category::Science,
            Difficulty::Easy,
            10,
            1,
            1,
            0,
            -1,
            now,
            now - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn rejects_counts_above_quota() {
        let now = fixed_now();
        let err = SessionSummary::from_persisted(
            "ana",
            Category::Science,
            Difficulty::Easy,
            10,
            8,
            2,
            1,
            0,
            now,
            now,
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::CountMismatch { quota: 10, sum: 11 });
    }

    #[test]
    fn overflowing_counts_are_a_mismatch() {
        let now = fixed_now();
        let err = SessionSummary::from_persisted(
            "ana",
            Category::Science,
            Difficulty::Easy,
            10,
            u32::MAX,
            1,
            0,
            0,
            now,
            now,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SessionSummaryError::CountMismatch {
                quota: 10,
                sum: u32::MAX
            }
        );
    }

    #[test]
    fn high_score_mirrors_summary() {
        let now = fixed_now();
        let summary = SessionSummary::from_stats(
            "ana",
            Category::Sports,
            Difficulty::Hard,
            10,
            &SessionStats::new(),
            now,
            now,
        )
        .unwrap();
        let entry = HighScoreEntry::from(&summary);
        assert_eq!(entry.player, "ana");
        assert_eq!(entry.score, 0);
        assert_eq!(entry.category, Category::Sports);
        assert_eq!(entry.recorded_at, now);
    }
}
