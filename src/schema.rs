//! The per-record-type registry: fields, presets, operations, mutations,
//! filters, sort comparators and the record loader.
//!
//! A schema is built once (registration takes `&mut self`) and then queried
//! through shared references, so registration can never race a running query.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::{
    context::{MutationContext, OperationContext},
    error::QueryError,
    filter, introspect,
    metadata::{MutationMetadata, OperationMetadata},
    mutation,
    output::OutputMode,
    parser::{FieldResolver, OperationValidator, ParserConfig},
    value::Value,
};

/// Extracts one field value from a record.
pub type FieldAccessor<T> = Box<dyn Fn(&T) -> Value>;

/// Read operation implementation.
pub type OperationHandler<T> = Box<dyn Fn(&OperationContext<'_, T>) -> Result<Value, QueryError>>;

/// Write operation implementation. The return value becomes the `result` of
/// the mutation envelope.
pub type MutationHandler<T> = Box<dyn Fn(&MutationContext<'_, T>) -> Result<Value, QueryError>>;

/// Loads every record. Called lazily, once per `items()` call.
pub type Loader<T> = Box<dyn Fn() -> Result<Vec<T>, QueryError>>;

/// String form of a record's field used for equality filtering.
pub type FilterAccessor<T> = Box<dyn Fn(&T) -> String>;

/// Natural ascending order for one field.
pub type SortComparator<T> = Box<dyn Fn(&T, &T) -> Ordering>;

pub type FilterFields<T> = HashMap<String, FilterAccessor<T>>;
pub type SortFields<T> = HashMap<String, SortComparator<T>>;

/// Construction-time settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    /// Root directory for full-text search
    pub data_dir: PathBuf,

    /// File extensions searched, with or without the leading dot
    pub extensions: Vec<String>,

    /// Encoding used by [`Schema::query_json`] and [`Schema::search_json`]
    pub output_mode: OutputMode,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        SchemaConfig {
            data_dir: PathBuf::from("."),
            extensions: vec![".md".to_string()],
            output_mode: OutputMode::Human,
        }
    }
}

impl SchemaConfig {
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }
}

pub struct Schema<T> {
    pub(crate) fields: HashMap<String, FieldAccessor<T>>,
    pub(crate) field_order: Vec<String>,
    pub(crate) presets: BTreeMap<String, Vec<String>>,
    pub(crate) default_fields: Vec<String>,
    pub(crate) operations: HashMap<String, OperationHandler<T>>,
    pub(crate) operation_metadata: HashMap<String, OperationMetadata>,
    pub(crate) mutations: HashMap<String, MutationHandler<T>>,
    pub(crate) mutation_metadata: HashMap<String, MutationMetadata>,
    pub(crate) filters: FilterFields<T>,
    pub(crate) filter_order: Vec<String>,
    pub(crate) sorts: SortFields<T>,
    pub(crate) sort_order: Vec<String>,
    pub(crate) loader: Option<Loader<T>>,
    pub(crate) config: SchemaConfig,
}

impl<T: 'static> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Schema<T> {
    /// An empty schema with default configuration. Only the built-in
    /// `schema()` operation is registered.
    pub fn new() -> Self {
        Self::with_config(SchemaConfig::default())
    }

    pub fn with_config(config: SchemaConfig) -> Self {
        let mut schema = Schema {
            fields: HashMap::new(),
            field_order: Vec::new(),
            presets: BTreeMap::new(),
            default_fields: Vec::new(),
            operations: HashMap::new(),
            operation_metadata: HashMap::new(),
            mutations: HashMap::new(),
            mutation_metadata: HashMap::new(),
            filters: HashMap::new(),
            filter_order: Vec::new(),
            sorts: HashMap::new(),
            sort_order: Vec::new(),
            loader: None,
            config,
        };
        schema.operation("schema", introspect::schema_operation::<T>);
        schema
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Register or replace a field accessor. Re-registering keeps the
    /// original position in the field order.
    pub fn field<F, V>(&mut self, name: impl Into<String>, accessor: F) -> &mut Self
    where
        F: Fn(&T) -> V + 'static,
        V: Into<Value>,
    {
        let name = name.into();
        if !self.fields.contains_key(&name) {
            self.field_order.push(name.clone());
        }
        self.fields
            .insert(name, Box::new(move |item: &T| -> Value { accessor(item).into() }));
        self
    }

    /// Register a named bundle of fields usable anywhere a field name is.
    pub fn preset<I, S>(&mut self, name: impl Into<String>, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.presets
            .insert(name.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Projection used when a statement has no `{ ... }` block. Entries may
    /// name presets.
    pub fn default_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn operation<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&OperationContext<'_, T>) -> Result<Value, QueryError> + 'static,
    {
        let name = name.into();
        self.mutations.remove(&name);
        self.mutation_metadata.remove(&name);
        self.operation_metadata.remove(&name);
        self.operations.insert(name, Box::new(handler));
        self
    }

    pub fn operation_with_metadata<F>(
        &mut self,
        name: impl Into<String>,
        handler: F,
        metadata: OperationMetadata,
    ) -> &mut Self
    where
        F: Fn(&OperationContext<'_, T>) -> Result<Value, QueryError> + 'static,
    {
        let name = name.into();
        self.operation(name.clone(), handler);
        self.operation_metadata.insert(name, metadata);
        self
    }

    /// Register a write operation. It is dispatched like any other operation
    /// but always answers with a mutation envelope.
    pub fn mutation<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&MutationContext<'_, T>) -> Result<Value, QueryError> + 'static,
    {
        let name = name.into();
        self.operation_metadata.remove(&name);
        self.mutations.insert(name.clone(), Box::new(handler));

        let wrapped = name.clone();
        self.operations.insert(
            name,
            Box::new(move |ctx: &OperationContext<'_, T>| mutation::run(&wrapped, ctx)),
        );
        self
    }

    pub fn mutation_with_metadata<F>(
        &mut self,
        name: impl Into<String>,
        handler: F,
        metadata: MutationMetadata,
    ) -> &mut Self
    where
        F: Fn(&MutationContext<'_, T>) -> Result<Value, QueryError> + 'static,
    {
        let name = name.into();
        self.mutation(name.clone(), handler);
        self.mutation_metadata.insert(name, metadata);
        self
    }

    /// Make a field usable as a `field=value` filter argument.
    ///
    /// The first registration also installs the built-in `distinct(field)`
    /// operation unless one is already registered.
    pub fn filterable_field<F>(&mut self, name: impl Into<String>, accessor: F) -> &mut Self
    where
        F: Fn(&T) -> String + 'static,
    {
        let name = name.into();
        if !self.filters.contains_key(&name) {
            self.filter_order.push(name.clone());
        }
        self.filters.insert(name, Box::new(accessor));

        if !self.operations.contains_key("distinct") {
            self.operation_with_metadata(
                "distinct",
                filter::distinct_operation::<T>,
                filter::distinct_metadata(),
            );
        }
        self
    }

    /// Make a field usable as a `sort_<field>=asc|desc` argument, ordered by
    /// the natural order of the accessor's value.
    pub fn sortable_field<F, V>(&mut self, name: impl Into<String>, accessor: F) -> &mut Self
    where
        F: Fn(&T) -> V + 'static,
        V: Ord + 'static,
    {
        self.sortable_field_fn(name, crate::sort::sort_field_of(accessor))
    }

    /// Like [`Schema::sortable_field`] with a custom comparator, for orders
    /// such as priority rankings.
    pub fn sortable_field_fn<F>(&mut self, name: impl Into<String>, compare: F) -> &mut Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        let name = name.into();
        if !self.sorts.contains_key(&name) {
            self.sort_order.push(name.clone());
        }
        self.sorts.insert(name, Box::new(compare));
        self
    }

    pub fn set_loader<F>(&mut self, loader: F) -> &mut Self
    where
        F: Fn() -> Result<Vec<T>, QueryError> + 'static,
    {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn has_mutations(&self) -> bool {
        !self.mutations.is_empty()
    }

    pub fn is_mutation(&self, name: &str) -> bool {
        self.mutations.contains_key(name)
    }

    /// False for unknown mutations and mutations without metadata.
    pub fn is_mutation_destructive(&self, name: &str) -> bool {
        self.mutation_metadata
            .get(name)
            .is_some_and(|meta| meta.destructive)
    }

    pub fn sort_fields(&self) -> &SortFields<T> {
        &self.sorts
    }

    pub fn filter_fields(&self) -> &FilterFields<T> {
        &self.filters
    }

    /// Parser settings reflecting the operations registered right now.
    pub fn parser_config(&self) -> ParserConfig<'_> {
        ParserConfig {
            operations: Some(self),
            field_resolver: Some(self),
        }
    }
}

impl<T> FieldResolver for Schema<T> {
    fn resolve_field(&self, name: &str) -> Result<Vec<String>, QueryError> {
        if let Some(expanded) = self.presets.get(name) {
            return Ok(expanded.clone());
        }
        if self.fields.contains_key(name) {
            return Ok(vec![name.to_string()]);
        }
        Err(QueryError::validation(format!("unknown field: {}", name)).with_detail("field", name))
    }
}

impl<T> OperationValidator for Schema<T> {
    fn is_known_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }
}
