use std::fmt;

/// Why a single corpus or dictionary line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Fewer tab-separated fields than the format requires
    FieldCount { expected: usize, found: usize },
    EmptyToken,
    /// The line is not valid UTF-8
    InvalidUtf8,
    /// A phone-string field with no phones in it (1-based field index)
    EmptyPhoneString { field: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseErrorKind::FieldCount { expected, found } => {
                write!(f, "expected at least {expected} tab-separated fields, found {found}")
            }
            ParseErrorKind::EmptyToken => write!(f, "empty token"),
            ParseErrorKind::InvalidUtf8 => write!(f, "not valid UTF-8"),
            ParseErrorKind::EmptyPhoneString { field } => {
                write!(f, "field {field} has no phones")
            }
        }
    }
}

/// A malformed input line. These are collected and counted, never fatal on their own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number in the source file, 0 when not known
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiphoneError {
    /// Missing, unreadable or malformed reference data. Always fatal.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A diphone reached the scoring pass without a frequency from the counting pass.
    #[error("Internal consistency error: diphone '{0}' has no corpus frequency")]
    InternalConsistency(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DiphoneError {
    pub fn configuration(message: impl Into<String>) -> Self {
        DiphoneError::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DiphoneError>;
