use serde::Serialize;

use crate::lexer::Position;

/// A single operation call.
///
/// # Example
/// ```text
/// get(task-1) { id name }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Operation name, never empty
    pub operation: String,

    /// Arguments in the order they were written
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Arg>,

    /// Projected field names.
    ///
    /// Already resolved and deduplicated when the parser had a field
    /// resolver, raw identifiers otherwise.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    /// Position of the operation name
    pub pos: Position,
}

impl Statement {
    /// Positional arguments, in order.
    pub fn positional_args(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter().filter(|arg| arg.is_positional())
    }

    /// First positional argument value.
    ///
    /// By convention this is the target ID of `get`/`update`/`delete`-style
    /// operations.
    pub fn first_positional(&self) -> Option<&str> {
        self.positional_args().next().map(|arg| arg.value.as_str())
    }

    /// Value of the last named argument with the given key.
    pub fn named(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .rev()
            .find(|arg| arg.key.as_deref() == Some(key))
            .map(|arg| arg.value.as_str())
    }
}

/// A statement argument.
///
/// # Examples
/// ```text
/// T1              // positional
/// status=done     // named
/// title="a, b"    // named, quoted value
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arg {
    /// Key for `key=value` arguments, `None` for positional ones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Argument value with quotes and escapes removed
    pub value: String,

    /// Position of the argument's first token
    pub pos: Position,
}

impl Arg {
    pub fn positional(value: impl Into<String>) -> Self {
        Arg {
            key: None,
            value: value.into(),
            pos: Position::default(),
        }
    }

    pub fn named(key: impl Into<String>, value: impl Into<String>) -> Self {
        Arg {
            key: Some(key.into()),
            value: value.into(),
            pos: Position::default(),
        }
    }

    pub fn is_positional(&self) -> bool {
        self.key.is_none()
    }
}
