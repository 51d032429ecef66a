use crate::model::{Difficulty, IncorrectRecord, OutcomeKind, RoundOutcome, SessionStats};

/// Points for a correct answer.
pub const BASE_POINTS: i32 = 1;
/// Bonus when the streak reaches [`SHORT_STREAK`].
pub const SHORT_STREAK_BONUS: i32 = 5;
/// Bonus when the streak reaches [`LONG_STREAK`]; the streak then restarts.
pub const LONG_STREAK_BONUS: i32 = 15;
pub const SHORT_STREAK: u32 = 3;
pub const LONG_STREAK: u32 = 5;

/// Score change produced by one resolved question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreDelta {
    /// Base points (+1) or penalty (negative).
    pub points: i32,
    /// Streak bonus awarded on this question, if any.
    pub bonus: i32,
    /// Whether the streak was reset by this question.
    pub streak_reset: bool,
}

impl ScoreDelta {
    #[must_use]
    pub fn total(&self) -> i32 {
        self.points + self.bonus
    }
}

/// Applies correctness, streak bonus and negative-marking rules to `SessionStats`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve one outcome into `stats`.
    ///
    /// - Correct: +1; +5 when the streak reaches 3; +15 when it reaches 5, after which
    ///   the streak restarts from 0.
    /// - Incorrect / timed out: minus the difficulty penalty, streak reset, and the
    ///   question (as displayed) is appended to the review list.
    /// - Skipped: only the skipped tally moves.
    pub fn resolve(
        &self,
        stats: &mut SessionStats,
        outcome: &RoundOutcome,
        difficulty: Difficulty,
    ) -> ScoreDelta {
        let delta = match outcome.kind {
            OutcomeKind::Correct => {
                stats.correct += 1;
                stats.streak += 1;
                let mut delta = ScoreDelta {
                    points: BASE_POINTS,
                    ..ScoreDelta::default()
                };
                if stats.streak == SHORT_STREAK {
                    delta.bonus = SHORT_STREAK_BONUS;
                } else if stats.streak == LONG_STREAK {
                    delta.bonus = LONG_STREAK_BONUS;
                    delta.streak_reset = true;
                    stats.streak = 0;
                }
                delta
            }
            OutcomeKind::Incorrect | OutcomeKind::TimedOut => {
                stats.wrong += 1;
                stats.streak = 0;
                stats.incorrect.push(IncorrectRecord::from(&outcome.shown));
                ScoreDelta {
                    points: -difficulty.penalty(),
                    bonus: 0,
                    streak_reset: true,
                }
            }
            OutcomeKind::Skipped => {
                stats.skipped += 1;
                ScoreDelta::default()
            }
        };

        stats.score += delta.total();
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionRecord, ShownQuestion};

    fn shown() -> ShownQuestion {
        ShownQuestion::unshuffled(&QuestionRecord::parse_line("Q|a|b|c|d|1", 1).unwrap())
    }

    fn correct() -> RoundOutcome {
        RoundOutcome::answered(shown(), 0)
    }

    fn incorrect() -> RoundOutcome {
        RoundOutcome::answered(shown(), 3)
    }

    #[test]
    fn streak_bonuses_and_reset_after_five() {
        let engine = ScoringEngine::new();
        let mut stats = SessionStats::new();
        let difficulty = Difficulty::Easy;

        let mut streaks = Vec::new();
        for _ in 0..8 {
            engine.resolve(&mut stats, &correct(), difficulty);
            streaks.push(stats.streak());
        }

        // 8 base points + 5 (3rd) + 15 (5th) + 5 (8th, streak back at 3).
        assert_eq!(stats.score(), 8 + 5 + 15 + 5);
        assert_eq!(streaks, vec![1, 2, 3, 4, 0, 1, 2, 3]);
        assert_eq!(stats.correct(), 8);
    }

    #[test]
    fn short_bonus_does_not_reset_streak() {
        let engine = ScoringEngine::new();
        let mut stats = SessionStats::new();
        for _ in 0..3 {
            engine.resolve(&mut stats, &correct(), Difficulty::Medium);
        }
        assert_eq!(stats.streak(), 3);
        assert_eq!(stats.score(), 8);
    }

    #[test]
    fn penalty_depends_only_on_difficulty() {
        let engine = ScoringEngine::new();
        for (difficulty, penalty) in [
            (Difficulty::Easy, 2),
            (Difficulty::Medium, 3),
            (Difficulty::Hard, 5),
        ] {
            let mut stats = SessionStats::new();
            engine.resolve(&mut stats, &correct(), difficulty);
            engine.resolve(&mut stats, &correct(), difficulty);
            let before = stats.score();

            let delta = engine.resolve(&mut stats, &incorrect(), difficulty);
            assert_eq!(stats.score(), before - penalty);
            assert_eq!(delta.total(), -penalty);
            assert_eq!(stats.streak(), 0);

            let before = stats.score();
            engine.resolve(&mut stats, &RoundOutcome::timed_out(shown()), difficulty);
            assert_eq!(stats.score(), before - penalty);
        }
    }

    #[test]
    fn score_can_go_negative() {
        let engine = ScoringEngine::new();
        let mut stats = SessionStats::new();
        engine.resolve(&mut stats, &incorrect(), Difficulty::Hard);
        engine.resolve(&mut stats, &RoundOutcome::timed_out(shown()), Difficulty::Hard);
        assert_eq!(stats.score(), -10);
        assert_eq!(stats.wrong(), 2);
        assert_eq!(stats.incorrect().len(), 2);
    }

    #[test]
    fn skip_leaves_streak_and_score() {
        let engine = ScoringEngine::new();
        let mut stats = SessionStats::new();
        engine.resolve(&mut stats, &correct(), Difficulty::Easy);
        engine.resolve(&mut stats, &correct(), Difficulty::Easy);

        let delta = engine.resolve(&mut stats, &RoundOutcome::skipped(shown()), Difficulty::Easy);
        assert_eq!(delta, ScoreDelta::default());
        assert_eq!(stats.streak(), 2);
        assert_eq!(stats.score(), 2);
        assert_eq!(stats.skipped(), 1);
        assert!(stats.incorrect().is_empty());

        // The streak carries over the skip.
        engine.resolve(&mut stats, &correct(), Difficulty::Easy);
        assert_eq!(stats.score(), 2 + 1 + 5);
    }

    #[test]
    fn scripted_medium_session() {
        use OutcomeKind::*;
        let engine = ScoringEngine::new();
        let mut stats = SessionStats::new();
        let script = [
            Correct, Correct, Correct, TimedOut, Skipped, Correct, Correct, Correct, Correct,
            Correct,
        ];
        for kind in script {
            let outcome = match kind {
                Correct => correct(),
                TimedOut => RoundOutcome::timed_out(shown()),
                Skipped => RoundOutcome::skipped(shown()),
                Incorrect => incorrect(),
            };
            engine.resolve(&mut stats, &outcome, Difficulty::Medium);
        }

        assert_eq!(stats.score(), 30);
        assert_eq!(stats.correct(), 8);
        assert_eq!(stats.wrong(), 1);
        assert_eq!(stats.skipped(), 1);
        assert_eq!(stats.resolved(), 10);
        assert_eq!(stats.streak(), 0);
    }
}
