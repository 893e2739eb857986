use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    UnrecognizedField,
    OrderingViolation,
    DuplicatePlayer,
    InvalidConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}

/// Failure raised while turning the raw grid into games. Every variant is
/// fatal for the whole file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized field \"{0}\"")]
    UnrecognizedField(String),
    #[error("invalid date \"{0}\"")]
    InvalidDate(String),
    #[error("\"{field}\" row appears before the \"Player\" row of its game")]
    OrderingViolation { field: String },
    #[error("game \"{0}\" appears more than once")]
    DuplicateGame(String),
    #[error("player \"{0}\" is listed twice in the same game")]
    DuplicatePlayer(String),
    #[error("line {line}: {source}")]
    AtLine {
        line: u64,
        #[source]
        source: Box<ParseError>,
    },
    #[error("failed to read input: {0}")]
    Csv(#[from] csv::Error),
}

impl ParseError {
    pub fn at_line(self, line: u64) -> Self {
        Self::AtLine {
            line,
            source: Box::new(self),
        }
    }

    pub fn code(&self) -> CoreErrorCode {
        match self {
            Self::UnrecognizedField(_) | Self::InvalidDate(_) => CoreErrorCode::UnrecognizedField,
            Self::OrderingViolation { .. } | Self::DuplicateGame(_) => {
                CoreErrorCode::OrderingViolation
            }
            Self::DuplicatePlayer(_) => CoreErrorCode::DuplicatePlayer,
            Self::AtLine { source, .. } => source.code(),
            Self::Csv(_) => CoreErrorCode::Io,
        }
    }
}

impl From<ParseError> for CoreError {
    fn from(err: ParseError) -> Self {
        CoreError::new(err.code(), err.to_string())
    }
}
