//! The `grep` subcommand.

use super::CliError;
use crate::{OutputMode, Schema, SearchOptions};

#[derive(Debug, Clone)]
pub struct GrepOptions {
    pub pattern: String,
    pub search: SearchOptions,
    pub mode: OutputMode,
}

pub fn execute_grep<T: 'static>(
    schema: &Schema<T>,
    options: &GrepOptions,
) -> Result<String, CliError> {
    Ok(schema.search_json_with_mode(&options.pattern, &options.search, options.mode)?)
}
