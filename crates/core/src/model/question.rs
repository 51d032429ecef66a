use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// Field delimiter used by the line-oriented question format.
pub const FIELD_DELIMITER: char = '|';

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A single malformed question line. Recoverable: the line is skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordParseError {
    #[error("line {line}: question text is empty")]
    EmptyPrompt { line: usize },

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: missing correct answer number")]
    MissingCorrect { line: usize },

    #[error("line {line}: invalid correct answer number: {raw}")]
    InvalidCorrect { line: usize, raw: String },

    #[error("line {line}: not valid UTF-8")]
    InvalidEncoding { line: usize },
}

impl RecordParseError {
    /// 1-based line number the error refers to.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::EmptyPrompt { line }
            | Self::FieldCount { line, .. }
            | Self::MissingCorrect { line }
            | Self::InvalidCorrect { line, .. }
            | Self::InvalidEncoding { line } => *line,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {raw}")]
pub struct UnknownVariant {
    kind: &'static str,
    raw: String,
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty level; selects a band of the category pool and the wrong-answer penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Points deducted for an incorrect or timed-out answer.
    #[must_use]
    pub fn penalty(self) -> i32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 5,
        }
    }

    /// Zero-based band number inside a category pool.
    #[must_use]
    pub fn band_number(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "easy" => Ok(Self::Easy),
            "2" | "medium" => Ok(Self::Medium),
            "3" | "hard" => Ok(Self::Hard),
            _ => Err(UnknownVariant {
                kind: "difficulty",
                raw: s.to_owned(),
            }),
        }
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Quiz category. Each category is backed by its own question pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Science,
    Computer,
    Sports,
    History,
    Iq,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Science,
        Category::Computer,
        Category::Sports,
        Category::History,
        Category::Iq,
    ];

    /// Key used by question sources (e.g. the file stem `science` for `science.txt`).
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Category::Science => "science",
            Category::Computer => "computer",
            Category::Sports => "sports",
            Category::History => "history",
            Category::Iq => "iq",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Science => "Science",
            Category::Computer => "Computer",
            Category::Sports => "Sports",
            Category::History => "History",
            Category::Iq => "IQ",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if let Ok(n) = lowered.parse::<usize>() {
            if (1..=Self::ALL.len()).contains(&n) {
                return Ok(Self::ALL[n - 1]);
            }
        }
        Self::ALL
            .into_iter()
            .find(|c| c.key() == lowered)
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                raw: s.to_owned(),
            })
    }
}

//
// ─── QUESTION RECORD ───────────────────────────────────────────────────────────
//

/// One multiple-choice question as loaded from a question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    prompt: String,
    options: [String; OPTION_COUNT],
    correct: usize,
}

impl QuestionRecord {
    /// Build a record from already-validated parts.
    ///
    /// Returns `None` if `correct` is not a valid option index.
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct: usize,
    ) -> Option<Self> {
        (correct < OPTION_COUNT).then(|| Self {
            prompt: prompt.into(),
            options,
            correct,
        })
    }

    /// Parse a `prompt|o1|o2|o3|o4|correct` line. `correct` is 1-based on disk.
    ///
    /// `line_no` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns `RecordParseError` when the line is malformed; callers skip the line.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, RecordParseError> {
        // Sources decode undecodable bytes lossily.
        if line.contains(char::REPLACEMENT_CHARACTER) {
            return Err(RecordParseError::InvalidEncoding { line: line_no });
        }

        let fields: Vec<&str> = line
            .trim_end_matches(['\r', '\n'])
            .split(FIELD_DELIMITER)
            .collect();

        let prompt = fields.first().map_or("", |p| p.trim());
        if prompt.is_empty() {
            return Err(RecordParseError::EmptyPrompt { line: line_no });
        }

        let expected = OPTION_COUNT + 2;
        if fields.len() == OPTION_COUNT + 1 {
            return Err(RecordParseError::MissingCorrect { line: line_no });
        }
        if fields.len() != expected {
            return Err(RecordParseError::FieldCount {
                line: line_no,
                expected,
                found: fields.len(),
            });
        }

        let raw_correct = fields[expected - 1].trim();
        if raw_correct.is_empty() {
            return Err(RecordParseError::MissingCorrect { line: line_no });
        }
        let correct = raw_correct
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=OPTION_COUNT).contains(n))
            .ok_or_else(|| RecordParseError::InvalidCorrect {
                line: line_no,
                raw: raw_correct.to_owned(),
            })?;

        let options = [
            fields[1].trim().to_owned(),
            fields[2].trim().to_owned(),
            fields[3].trim().to_owned(),
            fields[4].trim().to_owned(),
        ];

        Ok(Self {
            prompt: prompt.to_owned(),
            options,
            correct: correct - 1,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    /// Zero-based index of the correct option.
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
