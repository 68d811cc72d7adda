use crate::{
    context::OperationContext,
    error::QueryError,
    schema::Schema,
    value::{Map, Value},
};

/// The built-in `schema()` operation.
pub(crate) fn schema_operation<T: 'static>(
    ctx: &OperationContext<'_, T>,
) -> Result<Value, QueryError> {
    Ok(ctx.schema().describe())
}

impl<T: 'static> Schema<T> {
    /// Self-description of the registry.
    ///
    /// Keys: `operations` (sorted read operations, mutations excluded),
    /// `fields`, `presets`, `defaultFields`; plus `filterableFields`,
    /// `sortableFields` and `operationMetadata` when non-empty, and
    /// `mutations`/`mutationMetadata` when any mutation is registered. Every
    /// call builds a fresh value.
    pub fn describe(&self) -> Value {
        let mut out = Map::new();

        let mut operations: Vec<&String> = self
            .operations
            .keys()
            .filter(|name| !self.mutations.contains_key(*name))
            .collect();
        operations.sort();
        out.insert("operations".to_string(), strings(operations));

        out.insert("fields".to_string(), strings(&self.field_order));
        out.insert(
            "presets".to_string(),
            Value::Object(
                self.presets
                    .iter()
                    .map(|(name, fields)| (name.clone(), strings(fields)))
                    .collect(),
            ),
        );
        out.insert("defaultFields".to_string(), strings(&self.default_fields));

        if !self.filter_order.is_empty() {
            out.insert("filterableFields".to_string(), strings(&self.filter_order));
        }
        if !self.sort_order.is_empty() {
            out.insert("sortableFields".to_string(), strings(&self.sort_order));
        }

        let operation_metadata: Map = self
            .operation_metadata
            .iter()
            .filter(|(name, _)| !self.mutations.contains_key(*name))
            .map(|(name, meta)| (name.clone(), meta.to_value()))
            .collect();
        if !operation_metadata.is_empty() {
            out.insert(
                "operationMetadata".to_string(),
                Value::Object(operation_metadata),
            );
        }

        if self.has_mutations() {
            let mut mutations: Vec<&String> = self.mutations.keys().collect();
            mutations.sort();
            out.insert("mutations".to_string(), strings(mutations));
            out.insert(
                "mutationMetadata".to_string(),
                Value::Object(
                    self.mutation_metadata
                        .iter()
                        .map(|(name, meta)| (name.clone(), meta.to_value()))
                        .collect(),
                ),
            );
        }

        Value::Object(out)
    }
}

fn strings<I, S>(names: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Value::Array(
        names
            .into_iter()
            .map(|name| Value::from(name.as_ref()))
            .collect(),
    )
}
