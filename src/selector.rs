use std::collections::HashSet;

use crate::{
    error::QueryError,
    schema::Schema,
    value::{Map, Value},
};

/// The projection for one statement: which fields to emit, in which order.
///
/// Only accessors of selected fields are ever called.
pub struct FieldSelector<'a, T> {
    schema: &'a Schema<T>,
    ordered: Vec<String>,
}

impl<'a, T> FieldSelector<'a, T> {
    /// Project one record onto the selected fields.
    pub fn apply(&self, item: &T) -> Map {
        self.ordered
            .iter()
            .filter_map(|name| {
                let accessor = self.schema.fields.get(name)?;
                Some((name.clone(), accessor(item)))
            })
            .collect()
    }

    /// Project every record, producing an array of objects.
    pub fn apply_all<'i, I>(&self, items: I) -> Value
    where
        I: IntoIterator<Item = &'i T>,
        T: 'i,
    {
        Value::Array(
            items
                .into_iter()
                .map(|item| Value::Object(self.apply(item)))
                .collect(),
        )
    }

    pub fn include(&self, field: &str) -> bool {
        self.ordered.iter().any(|f| f == field)
    }

    /// Selected field names in projection order.
    pub fn fields(&self) -> Vec<String> {
        self.ordered.clone()
    }
}

impl<T: 'static> Schema<T> {
    /// Build the selector for a statement's already-resolved field list.
    ///
    /// An empty list falls back to the default fields, then to every
    /// registered field in registration order. Presets are expanded and
    /// duplicates dropped, keeping first occurrence.
    pub fn new_selector(&self, requested: &[String]) -> Result<FieldSelector<'_, T>, QueryError> {
        let requested = match (requested.is_empty(), self.default_fields.is_empty()) {
            (false, _) => requested,
            (true, false) => self.default_fields.as_slice(),
            (true, true) => self.field_order.as_slice(),
        };

        let mut expanded = Vec::with_capacity(requested.len());
        for name in requested {
            if let Some(preset) = self.presets.get(name) {
                expanded.extend(preset.iter().cloned());
            } else if self.fields.contains_key(name) {
                expanded.push(name.clone());
            } else {
                return Err(QueryError::validation(format!("unknown field: {}", name))
                    .with_detail("field", name));
            }
        }

        let mut seen = HashSet::new();
        expanded.retain(|name| seen.insert(name.clone()));

        Ok(FieldSelector {
            schema: self,
            ordered: expanded,
        })
    }
}
