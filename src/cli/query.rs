//! The `q` subcommand.

use super::CliError;
use crate::{OutputMode, Schema};

#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub query: String,
    pub mode: OutputMode,
}

/// Parse and run a read query. A parse error fails the command; statement
/// errors are rendered into the output like any other result.
pub fn execute_query<T: 'static>(
    schema: &Schema<T>,
    options: &QueryOptions,
) -> Result<String, CliError> {
    Ok(schema.query_json_with_mode(&options.query, options.mode)?)
}
