//! Query execution.
//!
//! Statements of a batch run strictly in source order, one after another, so
//! a later statement observes the effects of an earlier mutation. A failing
//! statement becomes an `{"error": {"message": ...}}` entry and does not stop
//! the rest of the batch.

use tracing::debug;

use crate::{
    ast::{Query, Statement},
    context::OperationContext,
    error::{ParseError, QueryError},
    output::{self, OutputMode},
    parser,
    schema::Schema,
    value::Value,
};

/// The outcome of one statement, with the field order used to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementResult {
    pub value: Value,
    pub fields: Vec<String>,
}

impl StatementResult {
    fn error(e: &QueryError) -> Self {
        StatementResult {
            value: error_entry(e),
            fields: Vec::new(),
        }
    }
}

/// `{"error": {"message": ...}}`
pub fn error_entry(e: &QueryError) -> Value {
    Value::object([("error", Value::object([("message", e.message.as_str())]))])
}

impl<T: 'static> Schema<T> {
    /// Parse with the operations and fields registered right now.
    pub fn parse(&self, input: &str) -> Result<Query, ParseError> {
        parser::parse(input, &self.parser_config())
    }

    /// Parse and execute. One statement yields its result directly; two or
    /// more yield an array with one entry per statement.
    pub fn query(&self, input: &str) -> Result<Value, ParseError> {
        let query = self.parse(input)?;
        Ok(self.execute(&query))
    }

    /// Execute an already-parsed query.
    pub fn execute(&self, query: &Query) -> Value {
        unwrap_results(self.run(query))
    }

    /// Execute and render with the schema's configured output mode.
    pub fn query_json(&self, input: &str) -> Result<String, ParseError> {
        self.query_json_with_mode(input, self.config.output_mode)
    }

    pub fn query_json_with_mode(&self, input: &str, mode: OutputMode) -> Result<String, ParseError> {
        let query = self.parse(input)?;
        Ok(self.execute_json_with_mode(&query, mode))
    }

    pub fn execute_json_with_mode(&self, query: &Query, mode: OutputMode) -> String {
        render(self.run(query), mode)
    }

    /// Execute every statement, keeping per-statement results.
    pub fn run(&self, query: &Query) -> Vec<StatementResult> {
        query
            .statements
            .iter()
            .map(|statement| match self.execute_statement(statement) {
                Ok(result) => result,
                Err(e) => {
                    debug!(operation = %statement.operation, error = %e, "statement failed");
                    StatementResult::error(&e)
                }
            })
            .collect()
    }

    fn execute_statement(&self, statement: &Statement) -> Result<StatementResult, QueryError> {
        let Some(handler) = self.operations.get(&statement.operation) else {
            return Err(
                QueryError::not_found(format!("unknown operation: {}", statement.operation))
                    .with_detail("operation", statement.operation.as_str()),
            );
        };

        let selector = self.new_selector(&statement.fields)?;
        let fields = selector.fields();
        let ctx = OperationContext::new(statement, selector, self);

        debug!(operation = %statement.operation, "dispatching");
        let value = handler(&ctx)?;
        Ok(StatementResult { value, fields })
    }
}

fn unwrap_results(mut results: Vec<StatementResult>) -> Value {
    if results.len() == 1
        && let Some(only) = results.pop()
    {
        return only.value;
    }
    Value::Array(results.into_iter().map(|r| r.value).collect())
}

/// Serialize results in the given mode.
pub fn render(results: Vec<StatementResult>, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => output::to_json(&unwrap_results(results)),
        OutputMode::Compact if results.len() == 1 => results
            .first()
            .map(|r| output::format_compact(&r.value, &r.fields))
            .unwrap_or_default(),
        OutputMode::Compact => output::join_compact(
            results
                .iter()
                .map(|r| output::format_compact(&r.value, &r.fields)),
        ),
    }
}
