mod band;
mod config;
mod lifeline;
mod outcome;
mod question;
mod session;
mod stats;

pub use band::DifficultyBand;
pub use config::{ConfigError, DiscardPolicy, SessionConfig};
pub use lifeline::{Lifeline, LifelineMisuse, LifelineState, REMOVED_OPTION, apply_fifty_fifty};
pub use outcome::{IncorrectRecord, OutcomeKind, RoundOutcome, ShownQuestion};
pub use question::{
    Category, Difficulty, FIELD_DELIMITER, OPTION_COUNT, QuestionRecord, RecordParseError,
    UnknownVariant,
};
pub use session::{HighScoreEntry, SessionSummary, SessionSummaryError};
pub use stats::SessionStats;
