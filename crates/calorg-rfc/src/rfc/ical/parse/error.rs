//! Parse errors with their position in the feed.

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// A parse failure at a 1-based line and column of the unfolded feed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{kind} at line {line}, column {column}{}",
    .context.as_deref().map_or_else(String::new, |context| format!(": {context}"))
)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
    pub context: Option<String>,
}

impl ParseError {
    #[must_use]
    pub fn at(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("missing property name")]
    MissingPropertyName,
    #[error("invalid property name")]
    InvalidPropertyName,
    #[error("missing colon separator")]
    MissingColon,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("unclosed quoted string")]
    UnclosedQuote,
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid date-time")]
    InvalidDateTime,
    #[error("invalid duration")]
    InvalidDuration,
    #[error("missing BEGIN:VCALENDAR")]
    MissingBegin,
    #[error("missing END line")]
    MissingEnd,
    #[error("mismatched BEGIN/END")]
    MismatchedComponent,
}
