//! The mutation envelope and the wrapper that adapts mutation handlers into
//! ordinary operations.
//!
//! A mutation never fails at the engine level. Structural validation errors
//! and handler errors alike come back as `{"ok": false, "errors": [...]}`, so a
//! caller can always tell whether the write happened by reading `ok`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    ast::Arg,
    context::{MutationContext, OperationContext},
    error::{ErrorCode, QueryError},
    filter::eq_fold,
    metadata::ParameterDef,
    value::{Map, Value},
};

/// One reason a mutation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationError {
    /// Offending parameter, when the error is about one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl From<QueryError> for MutationError {
    fn from(e: QueryError) -> Self {
        MutationError {
            field: None,
            message: e.message,
            code: Some(e.code),
        }
    }
}

/// `{ok, result?, errors?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<MutationError>,
}

impl MutationResult {
    pub fn success(result: Value) -> Self {
        MutationResult {
            ok: true,
            result,
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<MutationError>) -> Self {
        MutationResult {
            ok: false,
            result: Value::Null,
            errors,
        }
    }
}

impl From<MutationError> for Value {
    fn from(e: MutationError) -> Self {
        let mut map = Map::new();
        if let Some(field) = e.field {
            map.insert("field".to_string(), field.into());
        }
        map.insert("message".to_string(), e.message.into());
        if let Some(code) = e.code {
            map.insert("code".to_string(), code.as_str().into());
        }
        Value::Object(map)
    }
}

impl From<MutationResult> for Value {
    fn from(r: MutationResult) -> Self {
        let mut map = Map::new();
        map.insert("ok".to_string(), r.ok.into());
        if !r.result.is_null() {
            map.insert("result".to_string(), r.result);
        }
        if !r.errors.is_empty() {
            map.insert("errors".to_string(), r.errors.into());
        }
        Value::Object(map)
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v, "true" | "1" | "yes")
}

/// Dispatch the mutation `name` for an operation context.
pub(crate) fn run<T: 'static>(name: &str, ctx: &OperationContext<'_, T>) -> Result<Value, QueryError> {
    let schema = ctx.schema();
    let Some(handler) = schema.mutations.get(name) else {
        return Err(QueryError::not_found(format!("unknown operation: {}", name))
            .with_detail("operation", name));
    };

    let mut arg_map: BTreeMap<String, String> = ctx
        .statement
        .args
        .iter()
        .filter_map(|arg| Some((arg.key.clone()?, arg.value.clone())))
        .collect();

    let dry_run = arg_map.get("dry_run").is_some_and(|v| is_truthy(v));
    if dry_run {
        arg_map.remove("dry_run");
        debug!(mutation = name, "dry run");
    }

    if let Some(meta) = schema.mutation_metadata.get(name) {
        let errors = validate_args(&arg_map, &ctx.statement.args, &meta.parameters);
        if !errors.is_empty() {
            return Ok(MutationResult::failure(errors).into());
        }
    }

    let mctx = MutationContext::new(name, ctx, arg_map, dry_run);
    let result = match handler(&mctx) {
        Ok(value) => MutationResult::success(value),
        Err(e) => {
            debug!(mutation = name, error = %e, "mutation failed");
            MutationResult::failure(vec![e.into()])
        }
    };
    Ok(result.into())
}

/// Structural checks from declared parameters: required presence and enum
/// membership.
///
/// A required parameter missing by name may be supplied positionally: the
/// k-th such parameter is satisfied by the k-th non-empty positional
/// argument.
pub fn validate_args(
    arg_map: &BTreeMap<String, String>,
    args: &[Arg],
    params: &[ParameterDef],
) -> Vec<MutationError> {
    let mut positional = args
        .iter()
        .filter(|arg| arg.is_positional())
        .map(|arg| arg.value.as_str());

    let mut errors = Vec::new();
    for param in params {
        if param.required
            && !arg_map.contains_key(&param.name)
            && positional.next().is_none_or(str::is_empty)
        {
            errors.push(MutationError {
                field: Some(param.name.clone()),
                message: format!("required parameter {:?} is missing", param.name),
                code: Some(ErrorCode::Required),
            });
        }

        if param.allowed.is_empty() {
            continue;
        }
        if let Some(value) = arg_map.get(&param.name)
            && !param.allowed.iter().any(|allowed| eq_fold(value, allowed))
        {
            errors.push(MutationError {
                field: Some(param.name.clone()),
                message: format!(
                    "invalid value {:?} for {}, must be one of: {}",
                    value,
                    param.name,
                    param.allowed.join(", ")
                ),
                code: Some(ErrorCode::InvalidValue),
            });
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_second_required_param_needs_second_positional() {
        let params = vec![
            ParameterDef::new("id", "string").required(),
            ParameterDef::new("target", "string").required(),
        ];
        let errors = validate_args(&map(&[]), &[Arg::positional("T1")], &params);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some("target"));

        let both = [Arg::positional("T1"), Arg::positional("T2")];
        assert!(validate_args(&map(&[]), &both, &params).is_empty());
    }

    #[test]
    fn test_named_required_does_not_consume_positional() {
        let params = vec![
            ParameterDef::new("title", "string").required(),
            ParameterDef::new("id", "string").required(),
        ];
        let args = [Arg::named("title", "x"), Arg::positional("T1")];
        assert!(validate_args(&map(&[("title", "x")]), &args, &params).is_empty());
    }

    #[test]
    fn test_empty_positional_does_not_satisfy() {
        let params = vec![ParameterDef::new("id", "string").required()];
        let errors = validate_args(&map(&[]), &[Arg::positional("")], &params);
        assert_eq!(errors[0].code, Some(ErrorCode::Required));
    }

    #[test]
    fn test_enum_is_case_insensitive() {
        let params = vec![ParameterDef::new("status", "string").with_enum(["todo", "done"])];
        assert!(validate_args(&map(&[("status", "DONE")]), &[], &params).is_empty());

        let errors = validate_args(&map(&[("status", "nope")]), &[], &params);
        assert_eq!(
            errors[0].message,
            "invalid value \"nope\" for status, must be one of: todo, done"
        );
    }

    #[test]
    fn test_envelope_omits_empty_parts() {
        let v: Value = MutationResult::success(Value::Null).into();
        assert_eq!(crate::output::to_json(&v), r#"{"ok":true}"#);
    }
}
