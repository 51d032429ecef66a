use thiserror::Error;

use crate::model::{ConfigError, LifelineMisuse, RecordParseError, SessionSummaryError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    RecordParse(#[from] RecordParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lifeline(#[from] LifelineMisuse),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}
