//! CLI support for the `taskq` demo binary.
//!
//! Each subcommand is a plain function over a [`Schema`](crate::Schema), so
//! the same plumbing can be embedded in other tools or driven from tests
//! without spawning a process.

mod grep;
mod mutate;
mod query;
pub mod tasks;

pub use grep::{GrepOptions, execute_grep};
pub use mutate::{MutateOptions, execute_mutation};
pub use query::{QueryOptions, execute_query};
pub use tasks::{Task, TaskStore, build_schema};

use std::io;

use thiserror::Error;

use crate::{OutputMode, ParseError, QueryError};

/// Failures that end a CLI invocation with a non-zero exit status.
///
/// Statement errors and failed mutation envelopes are not here: they are
/// part of a successfully rendered response.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Search failures
    #[error("{}: {}", .0.code, .0.message)]
    Query(#[from] QueryError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("no query provided: pass it as an argument or pipe it to stdin")]
    NoInput,

    /// A request the command refuses to run as given
    #[error("{0}")]
    Usage(String),
}

/// `json` selects the indented human format; `compact` and `llm` select the
/// token-minimised one.
pub fn parse_output_mode(s: &str) -> Result<OutputMode, CliError> {
    s.parse::<OutputMode>()
        .map_err(|e| CliError::Usage(e.message))
}
