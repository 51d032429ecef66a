#![forbid(unsafe_code)]

pub mod bank;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use bank::QuestionBank;
pub use error::{LoadError, SessionError};

pub use sessions::{
    ChoiceInput, CompletedSession, InteractionSink, PlayerChoice, QuestionPicker, QuestionSession,
    QuestionView, QuizService, SessionNotice, SessionPlan, SessionReport, WaitOutcome,
    await_answer,
};
