mod interaction;
mod plan;
mod service;
mod timer;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use interaction::{ChoiceInput, InteractionSink, PlayerChoice, QuestionView, SessionNotice};
pub use plan::{QuestionPicker, SessionPlan};
pub use service::{CompletedSession, QuestionSession};
pub use timer::{WaitOutcome, await_answer};
pub use workflow::{QuizService, SessionReport};
