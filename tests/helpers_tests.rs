// tests/helpers_tests.rs

mod common;

use std::cmp::Ordering;

use agent_query::{
    Arg, ErrorCode, Predicate, SortDirection, build_sort_func, count_items, distinct, eq_fold,
    filter_items, match_all, paginate_slice, parse_skip_take, parse_sort_specs, sort_slice,
};
use common::{Item, items, schema};
use pretty_assertions::assert_eq;

fn ids(items: &[Item]) -> Vec<&'static str> {
    items.iter().map(|i| i.id).collect()
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_filter_and_count() {
    let done = filter_items(items(), |i: &Item| i.score > 6);
    assert_eq!(ids(&done), vec!["T1", "T3"]);
    assert_eq!(count_items(&items(), |i: &Item| i.tags.is_empty()), 1);
    assert_eq!(count_items(&items(), match_all()), 3);
}

#[test]
fn test_predicate_from_args() {
    let s = schema();
    let args = vec![Arg::named("status", "done"), Arg::named("other", "x")];
    let pred = Predicate::from_args(s.filter_fields(), &args);
    assert!(!pred.is_match_all());
    assert_eq!(ids(&filter_items(items(), |i| pred.matches(i))), vec!["T1", "T3"]);

    let none: Vec<Arg> = vec![Arg::positional("status")];
    assert!(Predicate::from_args(s.filter_fields(), &none).is_match_all());
    assert!(Predicate::<Item>::match_all().matches(&items()[0]));
}

#[test]
fn test_predicate_is_a_conjunction() {
    let mut s = schema();
    s.filterable_field("name", |i: &Item| i.name.to_string());
    let args = vec![Arg::named("status", "done"), Arg::named("name", "ALPHA")];
    let pred = Predicate::from_args(s.filter_fields(), &args);
    assert_eq!(ids(&filter_items(items(), |i| pred.matches(i))), vec!["T1"]);
}

#[test]
fn test_distinct_first_spelling_wins() {
    let values = distinct(&items(), |i: &Item| i.status.to_string());
    assert_eq!(values, vec!["done", "todo"]);
}

#[test]
fn test_eq_fold() {
    assert!(eq_fold("In-Progress", "in-progress"));
    assert!(eq_fold("ÄBC", "äbc"));
    assert!(!eq_fold("done", "don"));
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn test_sort_specs_keep_argument_order() {
    let specs = parse_sort_specs(&[Arg::named("sort_b", "desc"), Arg::named("sort_a", "Asc")])
        .unwrap();
    let fields: Vec<(&str, SortDirection)> = specs
        .iter()
        .map(|s| (s.field.as_str(), s.direction))
        .collect();
    assert_eq!(
        fields,
        vec![("b", SortDirection::Desc), ("a", SortDirection::Asc)]
    );
}

#[test]
fn test_multi_key_sort() {
    let mut s = schema();
    s.sortable_field("status", |i: &Item| i.status.to_lowercase());
    let mut data = items();
    sort_slice(
        &mut data,
        &[Arg::named("sort_status", "asc"), Arg::named("sort_score", "desc")],
        s.sort_fields(),
    )
    .unwrap();
    assert_eq!(ids(&data), vec!["T1", "T3", "T2"]);
}

#[test]
fn test_sort_is_stable() {
    let mut s = schema();
    s.sortable_field_fn("flat", |_: &Item, _: &Item| Ordering::Equal);
    let mut data = items();
    sort_slice(&mut data, &[Arg::named("sort_flat", "desc")], s.sort_fields()).unwrap();
    assert_eq!(ids(&data), vec!["T1", "T2", "T3"]);
}

#[test]
fn test_no_sort_args_is_noop() {
    let s = schema();
    let specs = parse_sort_specs(&[Arg::named("status", "x")]).unwrap();
    assert!(specs.is_empty());
    assert!(build_sort_func(&specs, s.sort_fields()).unwrap().is_none());
}

#[test]
fn test_unknown_sort_field() {
    let s = schema();
    let specs = parse_sort_specs(&[Arg::named("sort_tags", "asc")]).unwrap();
    let err = build_sort_func(&specs, s.sort_fields()).err().unwrap();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(err.message, "field \"tags\" is not sortable");
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn test_skip_take() {
    let args = [Arg::named("skip", "3"), Arg::named("take", "10")];
    assert_eq!(parse_skip_take(&args).unwrap(), (3, 10));
    let page = paginate_slice(vec![1, 2, 3, 4, 5], &args).unwrap();
    assert_eq!(page, vec![4, 5]);
}

#[test]
fn test_take_limits() {
    let page = paginate_slice(vec![1, 2, 3], &[Arg::named("take", "2")]).unwrap();
    assert_eq!(page, vec![1, 2]);
}

#[test]
fn test_pagination_validation() {
    let cases = [
        (Arg::named("skip", "-1"), "skip must be >= 0, got -1"),
        (Arg::named("skip", "1.5"), "skip must be an integer, got \"1.5\""),
        (Arg::named("take", "0"), "take must be > 0, got 0"),
        (Arg::named("take", "-2"), "take must be > 0, got -2"),
        (Arg::named("take", "many"), "take must be an integer, got \"many\""),
    ];
    for (arg, message) in cases {
        let err = paginate_slice(vec![1], &[arg]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, message);
    }
}

// ============================================================================
// Selector
// ============================================================================

#[test]
fn test_selector_include_and_order() {
    let s = schema();
    let sel = s
        .new_selector(&["score".to_string(), "basic".to_string()])
        .unwrap();
    assert_eq!(sel.fields(), vec!["score", "id", "name"]);
    assert!(sel.include("name"));
    assert!(!sel.include("tags"));

    let row = sel.apply(&items()[1]);
    let keys: Vec<&String> = row.keys().collect();
    assert_eq!(keys, vec!["id", "name", "score"]);
}

#[test]
fn test_selector_rejects_unknown() {
    let s = schema();
    let err = s.new_selector(&["nope".to_string()]).err().unwrap();
    assert_eq!(err.message, "unknown field: nope");
}
