use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    ast::{Arg, Statement},
    error::{ErrorCode, QueryError},
    filter::Predicate,
    paginate,
    schema::Schema,
    selector::FieldSelector,
    sort,
};

/// Everything a read handler needs for one statement.
pub struct OperationContext<'a, T> {
    pub statement: &'a Statement,
    pub selector: FieldSelector<'a, T>,
    /// AND of every `field=value` argument naming a filterable field
    pub predicate: Predicate<'a, T>,
    schema: &'a Schema<T>,
}

impl<'a, T: 'static> OperationContext<'a, T> {
    pub fn new(
        statement: &'a Statement,
        selector: FieldSelector<'a, T>,
        schema: &'a Schema<T>,
    ) -> Self {
        OperationContext {
            statement,
            selector,
            predicate: Predicate::from_args(&schema.filters, &statement.args),
            schema,
        }
    }

    /// Load every record. The loader runs on each call.
    pub fn items(&self) -> Result<Vec<T>, QueryError> {
        load(self.schema)
    }

    pub fn schema(&self) -> &'a Schema<T> {
        self.schema
    }

    /// Keep the records matching the statement's filter arguments.
    pub fn filter(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| self.predicate.matches(item))
            .collect()
    }

    /// Apply the statement's `sort_<field>` arguments in place.
    pub fn sort(&self, items: &mut [T]) -> Result<(), QueryError> {
        sort::sort_slice(items, &self.statement.args, &self.schema.sorts)
    }

    /// Apply the statement's `skip`/`take` arguments.
    pub fn paginate(&self, items: Vec<T>) -> Result<Vec<T>, QueryError> {
        paginate::paginate_slice(items, &self.statement.args)
    }
}

/// Everything a mutation handler needs.
pub struct MutationContext<'a, T> {
    pub mutation: &'a str,
    pub statement: &'a Statement,
    pub args: &'a [Arg],
    /// Named arguments, last occurrence wins, `dry_run` removed when truthy
    pub arg_map: BTreeMap<String, String>,
    /// Set by `dry_run=true|1|yes`. Handlers must honour it themselves.
    pub dry_run: bool,
    pub selector: &'a FieldSelector<'a, T>,
    schema: &'a Schema<T>,
}

impl<'a, T: 'static> MutationContext<'a, T> {
    pub(crate) fn new(
        mutation: &'a str,
        ctx: &'a OperationContext<'a, T>,
        arg_map: BTreeMap<String, String>,
        dry_run: bool,
    ) -> Self {
        MutationContext {
            mutation,
            statement: ctx.statement,
            args: &ctx.statement.args,
            arg_map,
            dry_run,
            selector: &ctx.selector,
            schema: ctx.schema,
        }
    }

    pub fn items(&self) -> Result<Vec<T>, QueryError> {
        load(self.schema)
    }

    pub fn schema(&self) -> &'a Schema<T> {
        self.schema
    }

    /// First positional argument, or `""` when there is none.
    pub fn positional_arg(&self) -> &str {
        self.statement.first_positional().unwrap_or("")
    }

    /// A named argument that must be present. Positional arguments are not
    /// considered.
    pub fn require_arg(&self, name: &str) -> Result<&str, QueryError> {
        self.arg_map.get(name).map(String::as_str).ok_or_else(|| {
            QueryError::new(
                ErrorCode::Required,
                format!("required parameter {:?} is missing", name),
            )
            .with_detail("field", name)
        })
    }

    pub fn arg_default<'s>(&'s self, name: &str, default: &'s str) -> &'s str {
        self.arg_map.get(name).map(String::as_str).unwrap_or(default)
    }
}

fn load<T>(schema: &Schema<T>) -> Result<Vec<T>, QueryError> {
    let loader = schema
        .loader
        .as_ref()
        .ok_or_else(|| QueryError::internal("no loader configured"))?;
    trace!("invoking record loader");
    loader()
}
