//! Error types.
//!
//! Two disjoint families: [`ParseError`] aborts a whole query before anything
//! runs, [`QueryError`] is raised by handlers, loaders and helpers while a
//! statement executes and is folded into the result stream by the engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lexer::Position;
use crate::value::Value;

/// Flat error code set shared by query and mutation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ParseError,
    NotFound,
    ValidationError,
    InternalError,
    /// Duplicate key or unique constraint violation
    Conflict,
    /// Authorization failure
    Forbidden,
    /// Optimistic concurrency check failed
    PreconditionFailed,
    /// Required mutation parameter missing
    Required,
    /// Enum or type mismatch on a mutation parameter
    InvalidValue,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::PreconditionFailed => "PRECONDITION_FAILED",
            ErrorCode::Required => "REQUIRED",
            ErrorCode::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntax error or a resolver rejection found while parsing.
///
/// Parsing is fail-fast: exactly one error is reported per failed parse.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("parse error at {}: {message}{}", location(.pos), detail_suffix(.got, .expected))]
pub struct ParseError {
    pub message: String,
    pub pos: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub got: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, pos: Position) -> Self {
        ParseError {
            message: message.into(),
            pos,
            got: None,
            expected: None,
        }
    }

    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

fn location(pos: &Position) -> String {
    format!("{}:{}", pos.line, pos.column)
}

fn detail_suffix(got: &Option<String>, expected: &Option<String>) -> String {
    match (got.as_deref().filter(|g| !g.is_empty()), expected) {
        (Some(got), Some(expected)) => format!(" (got {:?}, expected {})", got, expected),
        (Some(got), None) => format!(" (got {:?})", got),
        _ => String::new(),
    }
}

/// A structured execution error with a code, a message and optional details.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct QueryError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

impl QueryError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        QueryError {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Attach a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl From<ParseError> for QueryError {
    fn from(e: ParseError) -> Self {
        QueryError::parse(e.to_string())
            .with_detail("line", e.pos.line)
            .with_detail("column", e.pos.column)
    }
}
