//! The `m` subcommand.

use tracing::debug;

use super::CliError;
use crate::{Arg, OutputMode, Schema};

#[derive(Debug, Clone)]
pub struct MutateOptions {
    pub input: String,
    pub mode: OutputMode,
    /// Inject `dry_run=true` into every statement
    pub dry_run: bool,
    /// Allow mutations declared destructive
    pub confirm: bool,
}

/// Parse and run a batch of mutations.
///
/// Every statement must name a mutation. Destructive mutations run only with
/// `confirm`, unless the whole batch is a dry run.
pub fn execute_mutation<T: 'static>(
    schema: &Schema<T>,
    options: &MutateOptions,
) -> Result<String, CliError> {
    let mut query = schema.parse(&options.input)?;

    for statement in &query.statements {
        let name = statement.operation.as_str();
        if !schema.is_mutation(name) {
            return Err(CliError::Usage(format!(
                "{:?} is not a mutation; use the q command for reads",
                name
            )));
        }
        if schema.is_mutation_destructive(name) && !options.dry_run && !options.confirm {
            return Err(CliError::Usage(format!(
                "{:?} is destructive: pass --confirm to execute it or --dry-run to preview",
                name
            )));
        }
    }

    if options.dry_run {
        for statement in &mut query.statements {
            statement
                .args
                .retain(|arg| arg.key.as_deref() != Some("dry_run"));
            statement.args.push(Arg::named("dry_run", "true"));
        }
        debug!(statements = query.statements.len(), "dry run requested");
    }

    Ok(schema.execute_json_with_mode(&query, options.mode))
}
