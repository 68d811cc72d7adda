//! Multi-field sorting driven by `sort_<field>=asc|desc` arguments.

use std::cmp::Ordering;

use crate::{
    ast::Arg,
    error::QueryError,
    schema::{SortComparator, SortFields},
};

const SORT_PREFIX: &str = "sort_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One `sort_<field>=<direction>` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Comparator ordering records by the natural order of `accessor`.
pub fn sort_field_of<T, V, F>(accessor: F) -> impl Fn(&T, &T) -> Ordering
where
    F: Fn(&T) -> V,
    V: Ord,
{
    move |a: &T, b: &T| accessor(a).cmp(&accessor(b))
}

/// Extract sort directives in argument order.
///
/// The direction is case-insensitive and defaults to ascending when empty.
pub fn parse_sort_specs(args: &[Arg]) -> Result<Vec<SortSpec>, QueryError> {
    let mut specs = Vec::new();
    for arg in args {
        let Some(key) = arg.key.as_deref() else {
            continue;
        };
        let Some(field) = key.strip_prefix(SORT_PREFIX) else {
            continue;
        };
        if field.is_empty() {
            return Err(QueryError::validation("sort_ prefix requires a field name")
                .with_detail("arg", key));
        }

        let direction = match arg.value.to_lowercase().as_str() {
            "" | "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => {
                return Err(QueryError::validation(format!(
                    "sort direction must be 'asc' or 'desc', got {:?}",
                    arg.value
                ))
                .with_detail("field", field)
                .with_detail("value", arg.value.as_str()));
            }
        };

        specs.push(SortSpec {
            field: field.to_string(),
            direction,
        });
    }
    Ok(specs)
}

/// Chain the registered comparators named by `specs`: the first comparator
/// that tells two records apart decides. `None` when there is nothing to sort
/// by.
pub fn build_sort_func<'a, T>(
    specs: &[SortSpec],
    comparators: &'a SortFields<T>,
) -> Result<Option<impl Fn(&T, &T) -> Ordering>, QueryError> {
    if specs.is_empty() {
        return Ok(None);
    }

    let steps: Vec<(&'a SortComparator<T>, SortDirection)> = specs
        .iter()
        .map(|spec| {
            comparators
                .get(&spec.field)
                .map(|compare| (compare, spec.direction))
                .ok_or_else(|| {
                    QueryError::validation(format!("field {:?} is not sortable", spec.field))
                        .with_detail("field", spec.field.as_str())
                })
        })
        .collect::<Result<_, _>>()?;

    Ok(Some(move |a: &T, b: &T| {
        steps
            .iter()
            .map(|(compare, direction)| match direction {
                SortDirection::Asc => compare(a, b),
                SortDirection::Desc => compare(a, b).reverse(),
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }))
}

/// Stable in-place sort by the `sort_*` arguments. A no-op when there are
/// none.
pub fn sort_slice<T>(
    items: &mut [T],
    args: &[Arg],
    comparators: &SortFields<T>,
) -> Result<(), QueryError> {
    let specs = parse_sort_specs(args)?;
    if let Some(compare) = build_sort_func(&specs, comparators)? {
        items.sort_by(compare);
    }
    Ok(())
}
