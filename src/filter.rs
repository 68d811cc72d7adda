//! Declarative equality filtering on registered filterable fields.

use std::collections::HashSet;

use crate::{
    ast::Arg,
    context::OperationContext,
    error::QueryError,
    metadata::{OperationMetadata, ParameterDef},
    schema::{FilterAccessor, FilterFields},
    value::Value,
};

/// A conjunction of case-insensitive `field == value` checks.
///
/// Built from a statement's named arguments: only keys that name a
/// registered filterable field contribute; positional and unrelated
/// arguments are ignored. With no contributing argument it matches
/// everything.
pub struct Predicate<'a, T> {
    clauses: Vec<(&'a FilterAccessor<T>, &'a str)>,
}

impl<'a, T> Predicate<'a, T> {
    pub fn from_args(filters: &'a FilterFields<T>, args: &'a [Arg]) -> Self {
        let clauses = args
            .iter()
            .filter_map(|arg| {
                let key = arg.key.as_deref()?;
                filters.get(key).map(|accessor| (accessor, arg.value.as_str()))
            })
            .collect();
        Predicate { clauses }
    }

    pub fn match_all() -> Self {
        Predicate {
            clauses: Vec::new(),
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, item: &T) -> bool {
        self.clauses
            .iter()
            .all(|(accessor, expected)| eq_fold(&accessor(item), expected))
    }
}

/// Unicode case-insensitive string equality under simple case folding.
pub fn eq_fold(a: &str, b: &str) -> bool {
    a.chars().map(fold_char).eq(b.chars().map(fold_char))
}

/// The key two strings share when [`eq_fold`] holds for them.
pub(crate) fn fold_key(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// One char in, one char out. Chars whose lowercase form expands to several
/// chars fold to themselves; the remaining arms merge the case orbits that
/// lowercasing alone leaves apart.
fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    let folded = match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    };
    match folded {
        'ς' => 'σ',
        'ſ' => 's',
        'ϐ' => 'β',
        'ϑ' => 'θ',
        'ϕ' => 'φ',
        'ϖ' => 'π',
        'ϰ' => 'κ',
        'ϱ' => 'ρ',
        'ϵ' => 'ε',
        '\u{1FBE}' => 'ι',
        '\u{1E9B}' => '\u{1E61}',
        other => other,
    }
}

/// Items for which `pred` holds, in their original order.
pub fn filter_items<T, P>(items: Vec<T>, pred: P) -> Vec<T>
where
    P: Fn(&T) -> bool,
{
    items.into_iter().filter(|item| pred(item)).collect()
}

/// Number of items for which `pred` holds.
pub fn count_items<T, P>(items: &[T], pred: P) -> usize
where
    P: Fn(&T) -> bool,
{
    items.iter().filter(|item| pred(item)).count()
}

pub fn match_all<T>() -> impl Fn(&T) -> bool {
    |_: &T| true
}

/// Unique accessor values in first-seen order. Values differing only by case
/// count as one; the first spelling wins.
pub fn distinct<T, F>(items: &[T], accessor: F) -> Vec<String>
where
    F: Fn(&T) -> String,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .map(accessor)
        .filter(|value| seen.insert(fold_key(value)))
        .collect()
}

/// `distinct(field)`: unique values of a filterable field.
pub(crate) fn distinct_operation<T: 'static>(
    ctx: &OperationContext<'_, T>,
) -> Result<Value, QueryError> {
    let field = match ctx.statement.first_positional() {
        Some(field) if !field.is_empty() => field,
        _ => {
            return Err(QueryError::validation(
                "distinct requires a field name argument: distinct(field_name)",
            ));
        }
    };

    let schema = ctx.schema();
    let Some(accessor) = schema.filters.get(field) else {
        return Err(
            QueryError::validation(format!("unknown filterable field: {}", field))
                .with_detail("field", field)
                .with_detail("available", schema.filter_order.clone()),
        );
    };

    let items = ctx.items()?;
    Ok(distinct(&items, |item| accessor(item)).into())
}

pub(crate) fn distinct_metadata() -> OperationMetadata {
    OperationMetadata::new("Returns unique values for a filterable field.")
        .param(
            ParameterDef::new("field", "string")
                .with_description("Name of a registered filterable field."),
        )
        .example("distinct(status)")
        .example("distinct(assignee)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_fold() {
        assert!(eq_fold("Done", "done"));
        assert!(eq_fold("ÉTÉ", "été"));
        assert!(!eq_fold("done", "don"));
    }

    #[test]
    fn test_eq_fold_final_sigma() {
        assert!(eq_fold("ΟΔΟΣ", "οδος"));
        assert!(eq_fold("οδοσ", "οδος"));
        assert!(eq_fold("ſun", "SUN"));
        assert!(!eq_fold("İ", "i"));
    }

    #[test]
    fn test_distinct_agrees_with_eq_fold() {
        let items = vec!["ΟΔΟΣ", "οδος", "Straße", "STRASSE"];
        assert_eq!(
            distinct(&items, |s| s.to_string()),
            vec!["ΟΔΟΣ", "Straße", "STRASSE"]
        );
        assert!(!eq_fold("Straße", "STRASSE"));
    }

    #[test]
    fn test_distinct_first_spelling_wins() {
        let items = vec!["Open", "closed", "open", "CLOSED", "done"];
        assert_eq!(
            distinct(&items, |s| s.to_string()),
            vec!["Open", "closed", "done"]
        );
    }

    #[test]
    fn test_count_and_filter_helpers() {
        let items = vec![1, 2, 3, 4];
        assert_eq!(count_items(&items, |n| n % 2 == 0), 2);
        assert_eq!(filter_items(items.clone(), |n| *n > 2), vec![3, 4]);
        assert_eq!(filter_items(items, match_all()), vec![1, 2, 3, 4]);
    }
}
