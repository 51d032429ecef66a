use serde::{Deserialize, Serialize};

use crate::model::IncorrectRecord;

/// Running tallies for one quiz session.
///
/// Mutated only by the scoring engine; callers read a snapshot at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub(crate) score: i32,
    pub(crate) streak: u32,
    pub(crate) correct: u32,
    pub(crate) wrong: u32,
    pub(crate) skipped: u32,
    pub(crate) incorrect: Vec<IncorrectRecord>,
}

impl SessionStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current score. May be negative.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    /// Incorrect plus timed-out answers.
    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    /// Questions that reached a final outcome.
    #[must_use]
    pub fn resolved(&self) -> u32 {
        self.correct + self.wrong + self.skipped
    }

    /// Review list, in the order the questions were answered.
    #[must_use]
    pub fn incorrect(&self) -> &[IncorrectRecord] {
        &self.incorrect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScoringEngine;
    use crate::model::{Difficulty, QuestionRecord, RoundOutcome, ShownQuestion};

    #[test]
    fn snapshot_survives_json() {
        let shown =
            ShownQuestion::unshuffled(&QuestionRecord::parse_line("Q|a|b|c|d|2", 1).unwrap());
        let mut stats = SessionStats::new();
        let engine = ScoringEngine::new();
        engine.resolve(&mut stats, &RoundOutcome::answered(shown.clone(), 1), Difficulty::Easy);
        engine.resolve(&mut stats, &RoundOutcome::timed_out(shown), Difficulty::Easy);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["score"], -1);
        assert_eq!(json["incorrect"][0]["correct"], 1);

        let back: SessionStats = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
        assert_eq!(back.resolved(), 2);
    }
}
