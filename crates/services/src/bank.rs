use quiz_core::model::{
    Category, Difficulty, DifficultyBand, QuestionRecord, RecordParseError, SessionConfig,
};
use storage::repository::QuestionSource;

use crate::error::LoadError;

/// Question pool for one category, sliced into fixed-size difficulty bands.
///
/// Slot `i` holds line `i` of the source. Malformed lines leave an empty slot
/// and a `RecordParseError`; empty slots are never selected.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    category: Category,
    band_size: usize,
    slots: Vec<Option<QuestionRecord>>,
    skipped: Vec<RecordParseError>,
}

impl QuestionBank {
    /// Load and parse the pool for `category`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Missing` if the source has nothing for the category and
    /// `LoadError::Empty` if no line parses into a question.
    pub async fn load(
        source: &dyn QuestionSource,
        category: Category,
        config: &SessionConfig,
    ) -> Result<Self, LoadError> {
        let lines = source
            .fetch_records(category)
            .await
            .map_err(|e| LoadError::from_storage(category, e))?;
        Self::from_lines(category, lines, config)
    }

    /// Parse raw lines into a bank. At most `config.pool_capacity()` lines are used.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Empty` if no line parses into a question.
    pub fn from_lines<I, S>(
        category: Category,
        lines: I,
        config: &SessionConfig,
    ) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut slots = Vec::new();
        let mut skipped = Vec::new();

        for (i, line) in lines.into_iter().take(config.pool_capacity()).enumerate() {
            match QuestionRecord::parse_line(line.as_ref(), i + 1) {
                Ok(record) => slots.push(Some(record)),
                Err(err) => {
                    tracing::warn!(category = %category, error = %err, "skipping question record");
                    skipped.push(err);
                    slots.push(None);
                }
            }
        }

        if slots.iter().all(Option::is_none) {
            return Err(LoadError::Empty(category));
        }

        Ok(Self {
            category,
            band_size: config.band_size(),
            slots,
            skipped,
        })
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn band(&self, difficulty: Difficulty) -> DifficultyBand {
        DifficultyBand::new(difficulty, self.band_size)
    }

    /// Valid record at pool index `index`, if any.
    #[must_use]
    pub fn record(&self, index: usize) -> Option<&QuestionRecord> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn is_valid(&self, index: usize) -> bool {
        self.record(index).is_some()
    }

    /// Number of selectable questions in a band.
    #[must_use]
    pub fn valid_in_band(&self, band: DifficultyBand) -> usize {
        band.indices().filter(|&i| self.is_valid(i)).count()
    }

    /// Lines that were skipped while loading.
    #[must_use]
    pub fn skipped(&self) -> &[RecordParseError] {
        &self.skipped
    }

    /// Number of loaded lines, valid or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
