use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use quiz_core::ScoreDelta;
use quiz_core::model::{
    IncorrectRecord, Lifeline, LifelineState, OPTION_COUNT, OutcomeKind,
};

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// Everything a front end needs to draw one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView<'a> {
    /// 1-based position within the session.
    pub number: usize,
    pub quota: usize,
    pub prompt: &'a str,
    pub options: &'a [String; OPTION_COUNT],
    pub lifelines: LifelineState,
    pub time_left: Duration,
    pub score: i32,
}

/// Events reported to the player outside of question rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// The band holds fewer usable questions than requested.
    ShortPool { available: usize, quota: usize },
    /// Malformed lines were dropped while loading the bank.
    RecordsSkipped { count: usize },
    LifelineUsed(Lifeline),
    /// The lifeline was already spent; nothing changed.
    LifelineMisuse(Lifeline),
    /// Replace found no unused question to swap in.
    ExhaustedPool,
    ExtraTimeAdded { time_left: Duration },
    InvalidChoice { raw: String },
    Replaced,
    TimedOut,
    Resolved {
        kind: OutcomeKind,
        correct_answer: String,
        delta: ScoreDelta,
        score: i32,
    },
}

//
// ─── BOUNDARIES ────────────────────────────────────────────────────────────────
//

/// Output side of a session: rendering and notifications.
pub trait InteractionSink: Send {
    fn present_question(&mut self, view: &QuestionView<'_>);

    /// Countdown refresh, called once per tick while waiting for input.
    fn tick(&mut self, time_left: Duration);

    fn notice(&mut self, notice: &SessionNotice);

    /// One entry of the post-session review; `position` is 1-based.
    fn present_review(&mut self, position: usize, total: usize, record: &IncorrectRecord);
}

/// Input side of a session: raw lines typed by the player.
#[async_trait]
pub trait ChoiceInput: Send {
    /// Next raw input, or `None` once input is closed.
    ///
    /// Must be cancel-safe: the future may be dropped when the countdown expires.
    async fn next_choice(&mut self) -> Option<String>;

    /// Drop input that arrived after a timeout so it is not applied to the next question.
    fn discard_pending(&mut self);
}

#[async_trait]
impl ChoiceInput for UnboundedReceiver<String> {
    async fn next_choice(&mut self) -> Option<String> {
        self.recv().await
    }

    fn discard_pending(&mut self) {
        let mut dropped = 0usize;
        while self.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(dropped, "discarded late input");
        }
    }
}

//
// ─── PARSING ───────────────────────────────────────────────────────────────────
//

/// A raw input line interpreted against the question menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerChoice {
    /// 0-based display position.
    Option(usize),
    Lifeline(Lifeline),
    Invalid(String),
}

impl PlayerChoice {
    /// `1`-`4` pick an option, `5`-`8` invoke a lifeline; anything else is invalid.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<usize>() {
            Ok(n @ 1..=OPTION_COUNT) => PlayerChoice::Option(n - 1),
            Ok(n) => Lifeline::from_menu_number(n)
                .map_or_else(|| PlayerChoice::Invalid(trimmed.to_owned()), PlayerChoice::Lifeline),
            Err(_) => PlayerChoice::Invalid(trimmed.to_owned()),
        }
    }
}
