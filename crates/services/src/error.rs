//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{Category, Difficulty, SessionSummaryError};
use storage::repository::StorageError;

/// Errors that prevent a session from starting. Nothing is presented when one occurs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("no question source for category {0}")]
    Missing(Category),
    #[error("question source for category {0} has no usable questions")]
    Empty(Category),
    #[error("no usable {difficulty} questions in category {category}")]
    EmptyBand {
        category: Category,
        difficulty: Difficulty,
    },
    #[error(transparent)]
    Storage(StorageError),
}

impl LoadError {
    pub(crate) fn from_storage(category: Category, err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::Missing(category),
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("player name cannot be empty")]
    EmptyPlayer,
    #[error("player input closed before the session finished")]
    InputClosed,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}
