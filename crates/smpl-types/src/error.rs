use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics kept before the front end gives up.
pub const MAX_ERRORS: usize = 20;

/// Numeric diagnostic code.
///
/// Front-end codes live in E100–E199.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNEXPECTED_CHARACTER: Self = Self(101);
    pub const UNTERMINATED_STRING: Self = Self(102);
    pub const UNTERMINATED_COMMENT: Self = Self(103);
    pub const MALFORMED_NUMBER: Self = Self(104);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(105);
    pub const CHAINED_COMPARISON: Self = Self(106);
    pub const NESTING_TOO_DEEP: Self = Self(107);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A front-end diagnostic pointing at a location in a source file.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{span}: {code} {message}")]
pub struct SmplError {
    pub file: String,
    pub code: ErrorCode,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, for rendering.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl SmplError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Diagnostics collected by the lexer and parser.
///
/// At most [`MAX_ERRORS`] entries are stored; `total` keeps counting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<SmplError>,
    pub total: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total > 0
    }

    /// `true` once the cap is reached and callers should stop scanning.
    pub fn is_full(&self) -> bool {
        self.total >= MAX_ERRORS
    }

    pub fn push(&mut self, error: SmplError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total += 1;
    }

    /// Append another set, e.g. lexer diagnostics in front of parser ones.
    pub fn extend(&mut self, other: Diagnostics) {
        let stored = other.errors.len();
        for error in other.errors {
            self.push(error);
        }
        self.total += other.total.saturating_sub(stored);
    }
}
