use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;

use quiz_core::ScoringEngine;
use quiz_core::model::{
    Difficulty, Lifeline, LifelineState, OPTION_COUNT, RoundOutcome, SessionConfig, SessionStats,
    ShownQuestion,
};

use super::interaction::{ChoiceInput, InteractionSink, PlayerChoice, QuestionView, SessionNotice};
use super::plan::{QuestionPicker, SessionPlan, fisher_yates};
use super::timer::{WaitOutcome, await_answer};
use crate::bank::QuestionBank;
use crate::error::{LoadError, SessionError};

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Final state of a session that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSession {
    pub stats: SessionStats,
    /// Number of counted questions, possibly lower than configured.
    pub quota: usize,
    /// Bank indices thrown away by Replace.
    pub discarded: Vec<usize>,
}

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// A question on screen together with its time accounting.
#[derive(Debug, Clone)]
struct Round {
    index: usize,
    shown: ShownQuestion,
    /// Full limit for this question, extended by ExtraTime.
    limit: Duration,
    /// What is left of `limit` for the next wait.
    budget: Duration,
}

#[derive(Debug)]
enum Phase {
    SelectingQuestion { replacement: Option<usize> },
    Presenting { index: usize },
    AwaitingAnswer(Round),
    LifelineInvoked { lifeline: Lifeline, round: Round },
    Resolved(RoundOutcome),
    Complete,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz run over a single difficulty band.
///
/// Owns all per-session state: plan, lifelines and stats. Built fresh for every run.
pub struct QuestionSession<'a, R> {
    bank: &'a QuestionBank,
    config: &'a SessionConfig,
    difficulty: Difficulty,
    plan: SessionPlan,
    lifelines: LifelineState,
    stats: SessionStats,
    engine: ScoringEngine,
    rng: &'a mut R,
    quota: usize,
    counted: usize,
    discarded: Vec<usize>,
}

impl<'a, R: Rng + Send> QuestionSession<'a, R> {
    /// Plan a session over the `difficulty` band of `bank`, skipping `retired` indices.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::EmptyBand` if the band has no selectable question.
    pub fn new(
        bank: &'a QuestionBank,
        config: &'a SessionConfig,
        difficulty: Difficulty,
        retired: Option<&HashSet<usize>>,
        rng: &'a mut R,
    ) -> Result<Self, LoadError> {
        let picker = QuestionPicker::new(bank, difficulty);
        let plan = match retired {
            Some(retired) => picker.with_retired(retired).build(&mut *rng),
            None => picker.build(&mut *rng),
        };

        let available = plan.unused_count();
        if available == 0 {
            return Err(LoadError::EmptyBand {
                category: bank.category(),
                difficulty,
            });
        }

        Ok(Self {
            bank,
            config,
            difficulty,
            plan,
            lifelines: LifelineState::new(),
            stats: SessionStats::new(),
            engine: ScoringEngine::new(),
            rng,
            quota: config.quota().min(available),
            counted: 0,
            discarded: Vec::new(),
        })
    }

    /// Number of questions this session will count.
    #[must_use]
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Drive the session until `quota` questions are resolved.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InputClosed` if input ends mid-session.
    pub async fn run(
        mut self,
        input: &mut dyn ChoiceInput,
        sink: &mut dyn InteractionSink,
    ) -> Result<CompletedSession, SessionError> {
        if self.quota < self.config.quota() {
            sink.notice(&SessionNotice::ShortPool {
                available: self.quota,
                quota: self.config.quota(),
            });
        }
        tracing::info!(
            category = %self.bank.category(),
            difficulty = %self.difficulty,
            quota = self.quota,
            "session started"
        );

        let mut phase = Phase::SelectingQuestion { replacement: None };
        loop {
            phase = match phase {
                Phase::SelectingQuestion { replacement } => self.select(replacement),
                Phase::Presenting { index } => self.present(index),
                Phase::AwaitingAnswer(round) => self.await_round(round, input, sink).await?,
                Phase::LifelineInvoked { lifeline, round } => {
                    self.apply_lifeline(lifeline, round, sink)
                }
                Phase::Resolved(outcome) => self.resolve(&outcome, sink),
                Phase::Complete => break,
            };
        }

        tracing::info!(
            score = self.stats.score(),
            correct = self.stats.correct(),
            wrong = self.stats.wrong(),
            skipped = self.stats.skipped(),
            "session complete"
        );

        Ok(CompletedSession {
            stats: self.stats,
            quota: self.quota,
            discarded: self.discarded,
        })
    }

    // ─── PHASE STEPS ───────────────────────────────────────────────────────────

    fn select(&mut self, replacement: Option<usize>) -> Phase {
        if self.counted >= self.quota {
            return Phase::Complete;
        }
        match replacement.or_else(|| self.plan.next_index()) {
            Some(index) => Phase::Presenting { index },
            None => {
                tracing::warn!(
                    counted = self.counted,
                    quota = self.quota,
                    "question plan ran dry before quota"
                );
                Phase::Complete
            }
        }
    }

    fn present(&mut self, index: usize) -> Phase {
        let bank = self.bank;
        let Some(record) = bank.record(index) else {
            tracing::warn!(index, "planned question has no record");
            return Phase::SelectingQuestion { replacement: None };
        };

        let shown = if self.config.shuffle_options() {
            let mut order: [usize; OPTION_COUNT] = [0, 1, 2, 3];
            fisher_yates(&mut order, &mut *self.rng);
            ShownQuestion::with_order(record, order)
        } else {
            ShownQuestion::unshuffled(record)
        };

        let limit = self.config.time_limit();
        Phase::AwaitingAnswer(Round {
            index,
            shown,
            limit,
            budget: limit,
        })
    }

    async fn await_round(
        &mut self,
        mut round: Round,
        input: &mut dyn ChoiceInput,
        sink: &mut dyn InteractionSink,
    ) -> Result<Phase, SessionError> {
        sink.present_question(&QuestionView {
            number: self.counted + 1,
            quota: self.quota,
            prompt: &round.shown.prompt,
            options: &round.shown.options,
            lifelines: self.lifelines,
            time_left: round.budget,
            score: self.stats.score(),
        });

        let phase = match await_answer(input, sink, round.budget, self.config.tick()).await {
            WaitOutcome::Closed => return Err(SessionError::InputClosed),
            WaitOutcome::TimedOut => {
                sink.notice(&SessionNotice::TimedOut);
                Phase::Resolved(RoundOutcome::timed_out(round.shown))
            }
            WaitOutcome::Answered { raw, elapsed } => {
                round.budget = round.budget.saturating_sub(elapsed);
                match PlayerChoice::parse(&raw) {
                    PlayerChoice::Option(position) => {
                        Phase::Resolved(RoundOutcome::answered(round.shown, position))
                    }
                    PlayerChoice::Lifeline(lifeline) => Phase::LifelineInvoked { lifeline, round },
                    PlayerChoice::Invalid(raw) => {
                        sink.notice(&SessionNotice::InvalidChoice { raw });
                        Phase::AwaitingAnswer(round)
                    }
                }
            }
        };
        Ok(phase)
    }

    fn apply_lifeline(
        &mut self,
        lifeline: Lifeline,
        mut round: Round,
        sink: &mut dyn InteractionSink,
    ) -> Phase {
        if let Err(misuse) = self.lifelines.take(lifeline) {
            tracing::debug!(%misuse, "lifeline refused");
            sink.notice(&SessionNotice::LifelineMisuse(lifeline));
            return Phase::AwaitingAnswer(round);
        }
        tracing::debug!(%lifeline, index = round.index, "lifeline used");
        sink.notice(&SessionNotice::LifelineUsed(lifeline));

        match lifeline {
            Lifeline::FiftyFifty => {
                round.shown.eliminate_two();
            }
            Lifeline::Skip => return Phase::Resolved(RoundOutcome::skipped(round.shown)),
            Lifeline::Replace => {
                if let Some(replacement) = self.take_substitute() {
                    self.discarded.push(round.index);
                    sink.notice(&SessionNotice::Replaced);
                    return Phase::SelectingQuestion {
                        replacement: Some(replacement),
                    };
                }
                sink.notice(&SessionNotice::ExhaustedPool);
            }
            Lifeline::ExtraTime => {
                let extra = self.config.extra_time();
                round.limit += extra;
                round.budget += extra;
                sink.notice(&SessionNotice::ExtraTimeAdded {
                    time_left: round.budget,
                });
            }
        }

        if self.config.restart_timer_after_lifeline() {
            round.budget = round.limit;
        }
        Phase::AwaitingAnswer(round)
    }

    /// A substitute index, unless taking one would leave too few questions for the
    /// slots after the current one.
    fn take_substitute(&mut self) -> Option<usize> {
        let still_needed = self.quota - self.counted - 1;
        if self.plan.unused_count() <= still_needed {
            return None;
        }
        self.plan.substitute()
    }

    fn resolve(&mut self, outcome: &RoundOutcome, sink: &mut dyn InteractionSink) -> Phase {
        let delta = self
            .engine
            .resolve(&mut self.stats, outcome, self.difficulty);
        self.counted += 1;

        tracing::debug!(
            round = self.counted,
            kind = ?outcome.kind,
            delta = delta.total(),
            score = self.stats.score(),
            streak = self.stats.streak(),
            "question resolved"
        );

        sink.notice(&SessionNotice::Resolved {
            kind: outcome.kind,
            correct_answer: outcome.shown.options[outcome.shown.correct].clone(),
            delta,
            score: self.stats.score(),
        });
        Phase::SelectingQuestion { replacement: None }
    }
}
