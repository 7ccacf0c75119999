//! Error types for the two failure classes described by the engine's
//! error-handling design: pattern errors (attached to a parsed pattern,
//! non-fatal) and operational limits (thrown by the determinizer and the
//! brace expander).

use thiserror::Error;

/// Stable error codes surfaced on a parsed pattern. These never cause
/// [`crate::parser::parse`] to fail outright — a pattern with errors is
/// still returned, with the erroneous nodes contributing a best-effort
/// empty matcher. Callers are responsible for checking
/// [`crate::ast::PathPattern::errors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorCode {
    InvalidGlobstar,
    UnclosedBracket,
    UnclosedBrace,
    EmptyCharclass,
    InvalidRange,
    ExpansionLimit,
    NestedBraces,
    InvalidEscape,
    BannedFeature,
    InvalidRegex,
    UnsafeRegex,
    DfaStateLimit,
}

impl ParseErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidGlobstar => "INVALID_GLOBSTAR",
            Self::UnclosedBracket => "UNCLOSED_BRACKET",
            Self::UnclosedBrace => "UNCLOSED_BRACE",
            Self::EmptyCharclass => "EMPTY_CHARCLASS",
            Self::InvalidRange => "INVALID_RANGE",
            Self::ExpansionLimit => "EXPANSION_LIMIT",
            Self::NestedBraces => "NESTED_BRACES",
            Self::InvalidEscape => "INVALID_ESCAPE",
            Self::BannedFeature => "BANNED_FEATURE",
            Self::InvalidRegex => "INVALID_REGEX",
            Self::UnsafeRegex => "UNSAFE_REGEX",
            Self::DfaStateLimit => "DFA_STATE_LIMIT",
        }
    }
}

impl std::fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single pattern-level diagnostic, attached to the parsed pattern rather
/// than returned as a hard error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    pub code: ParseErrorCode,
    pub message: String,
    pub position: Option<usize>,
    pub length: Option<usize>,
}

impl PatternError {
    pub fn new(code: ParseErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), position: None, length: None }
    }

    pub fn at(mut self, position: usize, length: usize) -> Self {
        self.position = Some(position);
        self.length = Some(length);
        self
    }
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Operational, bounded-cost failures. These are distinct from
/// [`PatternError`] in that they represent the engine refusing to do
/// unbounded work rather than a malformed pattern.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LimitError {
    #[error("DFA state limit exceeded: limit={limit}, attempted={attempted}")]
    DfaStateLimit { limit: usize, attempted: usize },

    #[error("brace expansion limit exceeded: limit={limit}, actual={actual}")]
    ExpansionLimit { limit: usize, actual: usize },
}

impl LimitError {
    pub fn code(&self) -> ParseErrorCode {
        match self {
            Self::DfaStateLimit { .. } => ParseErrorCode::DfaStateLimit,
            Self::ExpansionLimit { .. } => ParseErrorCode::ExpansionLimit,
        }
    }
}
