#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;
pub mod text;

pub use repository::{
    InMemoryRepository, QuestionSource, SessionRecorder, Storage, StorageError,
};
