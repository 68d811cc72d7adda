use serde::Serialize;

use crate::ast::Statement;

/// A parsed query: one or more statements separated by `;`.
///
/// A successfully parsed query always holds at least one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// Statements in source order
    pub statements: Vec<Statement>,
}

impl Query {
    /// Returns true when the query is a batch of two or more statements.
    pub fn is_batch(&self) -> bool {
        self.statements.len() > 1
    }
}
