use thiserror::Error;

/// Reasons a time token could not be read as a minute of the day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeFormatError {
    #[error("empty time token")]
    Empty,
    #[error("time '{0}' contains no hour digits")]
    NoDigits(String),
    #[error("hour out of range in '{0}'")]
    HourOutOfRange(String),
    #[error("minute out of range in '{0}'")]
    MinuteOutOfRange(String),
    #[error("unrecognized time suffix in '{0}'")]
    BadSuffix(String),
}

/// What went wrong on a rejected schedule line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid time: {0}")]
    Format(#[from] TimeFormatError),
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("event has no category (add '@Name' inline or set an active category)")]
    MissingCategory,
    #[error("'{name}' is already defined as '{existing}', cannot redefine as '{requested}'")]
    DuplicateDefinition {
        name: String,
        existing: String,
        requested: String,
    },
}

impl ParseErrorKind {
    pub fn syntax<T: Into<String>>(message: T) -> Self {
        ParseErrorKind::Syntax(message.into())
    }
}

/// A fatal schedule error, pinned to the offending line.
///
/// Parsing is all-or-nothing: the first `ParseError` aborts the run and no
/// partial schedule is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}: '{text}'")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// The line exactly as it appeared in the input.
    pub text: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, text: &str, kind: ParseErrorKind) -> Self {
        Self {
            line,
            text: text.to_string(),
            kind,
        }
    }
}
