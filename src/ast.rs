//! # Abstract Syntax Tree
//!
//! The AST produced by the [`Parser`](crate::parser::Parser) for the agent
//! query DSL.
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[statements]** - One operation invocation and its arguments
//! - **[query]** - A `;`-separated batch of statements
//!
//! ## Quick Start
//!
//! ```text
//! list(status=done, sort_name=asc, take=5) { overview }
//! ```
//!
//! This is one statement: the `list` operation, three named arguments and a
//! projection naming the `overview` preset.
//!
//! ## Statements
//!
//! ```text
//! operation(arg, key=value, key="quoted value") { field preset ... }
//! ```
//!
//! - Arguments are positional (`T1`) or named (`status=done`). Values are bare
//!   identifiers or double-quoted strings.
//! - The projection block is optional. When a field resolver is configured the
//!   names are validated and presets are expanded while parsing.
//!
//! ## Batches
//!
//! ```text
//! get(task-1) { full }; count(status=done); update(task-2, status=done)
//! ```
//!
//! Statements run in order; each one produces its own result.

pub mod query;
pub mod statements;
pub mod tokens;

pub use query::Query;
pub use statements::{Arg, Statement};
pub use tokens::{Token, TokenKind};
