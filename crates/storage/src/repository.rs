use async_trait::async_trait;
use quiz_core::model::{Category, HighScoreEntry, SessionSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),
}

/// Source of raw question lines for a category, in stored order.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch every raw record line for `category`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the category has no backing source,
    /// or other storage errors.
    async fn fetch_records(&self, category: Category) -> Result<Vec<String>, StorageError>;
}

/// Append-only sink for finished sessions and leaderboard rows.
#[async_trait]
pub trait SessionRecorder: Send + Sync {
    /// Append a session log entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn append_log(&self, summary: &SessionSummary) -> Result<(), StorageError>;

    /// Append a leaderboard row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn append_high_score(&self, entry: &HighScoreEntry) -> Result<(), StorageError>;

    /// Best scores first; ties keep the earlier entry first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if entries cannot be read.
    async fn top_scores(&self, limit: u32) -> Result<Vec<HighScoreEntry>, StorageError>;

    /// Most recent session logs first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if entries cannot be read.
    async fn recent_logs(&self, limit: u32) -> Result<Vec<SessionSummary>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<Category, Vec<String>>>>,
    logs: Arc<Mutex<Vec<SessionSummary>>>,
    scores: Arc<Mutex<Vec<HighScoreEntry>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the question lines for a category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_questions<I, S>(&self, category: Category, lines: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(category, lines.into_iter().map(Into::into).collect());
        Ok(())
    }
}

#[async_trait]
impl QuestionSource for InMemoryRepository {
    async fn fetch_records(&self, category: Category) -> Result<Vec<String>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&category).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl SessionRecorder for InMemoryRepository {
    async fn append_log(&self, summary: &SessionSummary) -> Result<(), StorageError> {
        let mut guard = self
            .logs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(summary.clone());
        Ok(())
    }

    async fn append_high_score(&self, entry: &HighScoreEntry) -> Result<(), StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(entry.clone());
        Ok(())
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<HighScoreEntry>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut out = guard.clone();
        // Stable sort keeps insertion order among equal scores.
        out.sort_by(|a, b| b.score.cmp(&a.score));
        out.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(out)
    }

    async fn recent_logs(&self, limit: u32) -> Result<Vec<SessionSummary>, StorageError> {
        let guard = self
            .logs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard.iter().rev().take(take).cloned().collect())
    }
}

/// Aggregates the question source and recorder behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionSource>,
    pub recorder: Arc<dyn SessionRecorder>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self::from_repository(repo)
    }

    /// Use one in-memory repository for both roles, so tests can seed and inspect it.
    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionSource> = Arc::new(repo.clone());
        let recorder: Arc<dyn SessionRecorder> = Arc::new(repo);
        Self {
            questions,
            recorder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Difficulty;
    use quiz_core::time::fixed_now;

    fn entry(player: &str, score: i32) -> HighScoreEntry {
        HighScoreEntry {
            player: player.to_owned(),
            score,
            category: Category::Science,
            difficulty: Difficulty::Easy,
            recorded_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let repo = InMemoryRepository::new();
        repo.put_questions(Category::Science, ["Q|a|b|c|d|1"]).unwrap();

        assert_eq!(repo.fetch_records(Category::Science).await.unwrap().len(), 1);
        assert!(matches!(
            repo.fetch_records(Category::History).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn top_scores_sorted_and_stable() {
        let repo = InMemoryRepository::new();
        for (p, s) in [("a", 3), ("b", 9), ("c", 3), ("d", -4)] {
            repo.append_high_score(&entry(p, s)).await.unwrap();
        }

        let top = repo.top_scores(3).await.unwrap();
        let names: Vec<_> = top.iter().map(|e| e.player.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
