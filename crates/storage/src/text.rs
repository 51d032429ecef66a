use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::Category;

use crate::repository::{QuestionSource, StorageError};

/// Reads `<dir>/<category key>.txt`, one `prompt|o1|o2|o3|o4|correct` record per line.
///
/// Lines are decoded one at a time. A line that is not valid UTF-8 comes back
/// lossily decoded, so the parser rejects that line alone.
#[derive(Debug, Clone)]
pub struct TextQuestionSource {
    dir: PathBuf,
}

impl TextQuestionSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, category: Category) -> PathBuf {
        self.dir.join(format!("{}.txt", category.key()))
    }
}

#[async_trait]
impl QuestionSource for TextQuestionSource {
    async fn fetch_records(&self, category: Category) -> Result<Vec<String>, StorageError> {
        let path = self.path_for(category);
        let raw = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound,
            _ => StorageError::Io(format!("{}: {e}", path.display())),
        })?;

        Ok(split_lines(&raw))
    }
}

fn split_lines(raw: &[u8]) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    let body = raw.strip_suffix(b"\n").unwrap_or(raw);
    body.split(|&b| b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            String::from_utf8_lossy(line).into_owned()
        })
        .collect()
}
