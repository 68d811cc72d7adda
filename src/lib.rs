pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod context;
pub mod engine;
pub mod error;
pub mod filter;
pub mod introspect;
pub mod lexer;
pub mod metadata;
pub mod mutation;
pub mod output;
pub mod paginate;
pub mod parser;
pub mod schema;
pub mod search;
pub mod selector;
pub mod sort;
pub mod value;

pub use ast::{Arg, Query, Statement, Token, TokenKind};
pub use context::{MutationContext, OperationContext};
pub use engine::{StatementResult, error_entry, render};
pub use error::{ErrorCode, ParseError, QueryError};
pub use filter::{Predicate, count_items, distinct, eq_fold, filter_items, match_all};
pub use lexer::{Lexer, Position};
pub use metadata::{MutationMetadata, OperationMetadata, ParameterDef};
pub use mutation::{MutationError, MutationResult, validate_args};
pub use output::{OutputMode, format_compact, to_json, to_json_pretty};
pub use paginate::{paginate_slice, parse_skip_take};
pub use parser::{FieldResolver, OperationValidator, Parser, ParserConfig, parse};
pub use schema::{Schema, SchemaConfig};
pub use search::{
    FileSystemSearchProvider, SearchOptions, SearchProvider, SearchResult, Source, compile_pattern,
    format_search_compact, match_lines, search,
};
pub use selector::FieldSelector;
pub use sort::{SortDirection, SortSpec, build_sort_func, parse_sort_specs, sort_field_of, sort_slice};
pub use value::{Map, Value};
