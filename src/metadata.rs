//! Self-describing documentation attached to operations and mutations,
//! surfaced through the built-in `schema()` operation so agents can discover
//! parameters without external docs.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One parameter accepted by an operation or mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    pub name: String,

    /// Free-form type label such as `string`, `int` or `bool`
    #[serde(rename = "type")]
    pub ty: String,

    pub optional: bool,

    /// Checked by the mutation wrapper before the handler runs
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Allowed values, compared case-insensitively
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ParameterDef {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        ParameterDef {
            name: name.into(),
            ty: ty.into(),
            ..Default::default()
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Documentation for a read operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl OperationMetadata {
    pub fn new(description: impl Into<String>) -> Self {
        OperationMetadata {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn param(mut self, param: ParameterDef) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        serde_json::to_value(self).map(Value::from).unwrap_or_default()
    }
}

/// Documentation and safety flags for a mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDef>,

    /// Deletes or irreversibly changes data; CLIs ask for confirmation
    #[serde(default)]
    pub destructive: bool,

    /// Safe to retry with the same arguments
    #[serde(default)]
    pub idempotent: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl MutationMetadata {
    pub fn new(description: impl Into<String>) -> Self {
        MutationMetadata {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn param(mut self, param: ParameterDef) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        serde_json::to_value(self).map(Value::from).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_def_keys() {
        let p = ParameterDef::new("status", "string")
            .with_enum(["todo", "done"])
            .with_default("todo")
            .with_description("Task status");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "status",
                "type": "string",
                "optional": false,
                "default": "todo",
                "description": "Task status",
                "enum": ["todo", "done"],
            })
        );
    }

    #[test]
    fn test_mutation_metadata_flags_always_present() {
        let meta = MutationMetadata::new("Delete a task").destructive();
        let v = meta.to_value();
        assert_eq!(v.get("destructive"), Some(&Value::Boolean(true)));
        assert_eq!(v.get("idempotent"), Some(&Value::Boolean(false)));
        assert_eq!(v.get("parameters"), None);
    }
}
