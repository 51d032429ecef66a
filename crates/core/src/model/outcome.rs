use serde::{Deserialize, Serialize};

use crate::model::{OPTION_COUNT, QuestionRecord, apply_fifty_fifty};

/// A question as it is displayed: options in display order, with the
/// correct answer's display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShownQuestion {
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    pub correct: usize,
}

impl ShownQuestion {
    /// Present `record` with its options in the given display order.
    ///
    /// `order[i]` is the original option index displayed at position `i`;
    /// it must be a permutation of `0..4`.
    #[must_use]
    pub fn with_order(record: &QuestionRecord, order: [usize; OPTION_COUNT]) -> Self {
        let options = order.map(|src| record.options()[src].clone());
        let correct = order
            .iter()
            .position(|&src| src == record.correct())
            .unwrap_or(record.correct());
        Self {
            prompt: record.prompt().to_owned(),
            options,
            correct,
        }
    }

    /// Present `record` in its stored option order.
    #[must_use]
    pub fn unshuffled(record: &QuestionRecord) -> Self {
        Self::with_order(record, [0, 1, 2, 3])
    }

    /// Apply 50/50 to the displayed options.
    pub fn eliminate_two(&mut self) -> [usize; 2] {
        apply_fifty_fifty(&mut self.options, self.correct)
    }
}

/// How a single question attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Correct,
    Incorrect,
    TimedOut,
    Skipped,
}

impl OutcomeKind {
    /// Incorrect and timed-out answers both count as wrong.
    #[must_use]
    pub fn is_wrong(self) -> bool {
        matches!(self, OutcomeKind::Incorrect | OutcomeKind::TimedOut)
    }
}

/// Result of one question attempt, with the question exactly as shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub kind: OutcomeKind,
    pub chosen: Option<usize>,
    pub shown: ShownQuestion,
}

impl RoundOutcome {
    /// Outcome for a player choosing display position `chosen`.
    #[must_use]
    pub fn answered(shown: ShownQuestion, chosen: usize) -> Self {
        let kind = if chosen == shown.correct {
            OutcomeKind::Correct
        } else {
            OutcomeKind::Incorrect
        };
        Self {
            kind,
            chosen: Some(chosen),
            shown,
        }
    }

    #[must_use]
    pub fn timed_out(shown: ShownQuestion) -> Self {
        Self {
            kind: OutcomeKind::TimedOut,
            chosen: None,
            shown,
        }
    }

    #[must_use]
    pub fn skipped(shown: ShownQuestion) -> Self {
        Self {
            kind: OutcomeKind::Skipped,
            chosen: None,
            shown,
        }
    }
}

/// A wrongly answered (or timed-out) question kept for post-session review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncorrectRecord {
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    pub correct: usize,
}

impl From<&ShownQuestion> for IncorrectRecord {
    fn from(shown: &ShownQuestion) -> Self {
        Self {
            prompt: shown.prompt.clone(),
            options: shown.options.clone(),
            correct: shown.correct,
        }
    }
}
