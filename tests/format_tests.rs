// tests/format_tests.rs

mod common;

use agent_query::output::{format_compact, join_compact, to_json, to_json_pretty};
use agent_query::{OutputMode, Value};
use common::schema;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn order(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

fn compact(input: &str) -> String {
    schema()
        .query_json_with_mode(input, OutputMode::Compact)
        .unwrap()
}

// ============================================================================
// Tables
// ============================================================================

#[test]
fn test_table_quotes_commas() {
    let rows = Value::Array(vec![Value::object([("id", "T1"), ("name", "a,b")])]);
    assert_eq!(
        format_compact(&rows, &order(&["id", "name"])),
        "id,name\nT1,\"a,b\"\n"
    );
}

#[test]
fn test_table_follows_requested_order() {
    assert_eq!(
        compact("list(sort_score=asc) { score id }"),
        "score,id\n5,T2\n7,T3\n10,T1\n"
    );
}

#[test]
fn test_table_quotes_records() {
    assert_eq!(
        compact("list(status=done) { id name }"),
        "id,name\nT1,alpha\nT3,\"gamma, the third\"\n"
    );
}

#[test]
fn test_table_encodes_arrays_as_json() {
    assert_eq!(
        compact("list(take=2) { id tags }"),
        "id,tags\nT1,\"[\"\"a\"\",\"\"b\"\"]\"\nT2,[]\n"
    );
}

#[test]
fn test_empty_list_is_header_only() {
    assert_eq!(compact("list(status=blocked) { id name }"), "id,name\n");
}

#[test]
fn test_table_without_order_uses_first_row_keys() {
    let rows = Value::Array(vec![
        Value::object([("b", 1), ("a", 2)]),
        Value::object([("a", 3)]),
    ]);
    assert_eq!(format_compact(&rows, &[]), "a,b\n2,1\n3,\n");
}

#[test]
fn test_mixed_list_falls_back_to_json() {
    let mixed = Value::Array(vec![Value::object([("a", 1)]), Value::from("x")]);
    assert_eq!(format_compact(&mixed, &[]), r#"[{"a":1},"x"]"#);
}

// ============================================================================
// Single objects and fallbacks
// ============================================================================

#[test]
fn test_single_object_key_value_lines() {
    assert_eq!(compact("get(T3) { name status }"), "name:gamma, the third\nstatus:Done\n");
}

#[test]
fn test_key_value_escapes_newlines() {
    let obj = Value::object([("note", "line one\nline two")]);
    assert_eq!(
        format_compact(&obj, &order(&["note"])),
        "note:line one\\nline two\n"
    );
}

#[test]
fn test_result_with_foreign_keys_uses_sorted_keys() {
    assert_eq!(compact("count(status=done)"), "count:2\n");
}

#[test]
fn test_errors_render_as_json() {
    assert_eq!(
        compact("get(T9)"),
        r#"{"error":{"message":"item \"T9\" not found"}}"#
    );
}

#[test]
fn test_scalar_lists_render_as_json() {
    assert_eq!(compact("distinct(status)"), r#"["done","todo"]"#);
}

// ============================================================================
// Batches
// ============================================================================

#[test]
fn test_compact_batch_separated_by_blank_line() {
    assert_eq!(
        compact("count(); get(T1) { id }; fail()"),
        "count:3\n\nid:T1\n\n{\"error\":{\"message\":\"intentional failure\"}}\n"
    );
}

#[test]
fn test_join_compact() {
    assert_eq!(
        join_compact(vec!["a:1\n".to_string(), "[1]".to_string()]),
        "a:1\n\n[1]\n"
    );
}

#[test]
fn test_human_batch_is_json_array() {
    let out = schema()
        .query_json_with_mode("count(); get(T2) { id }", OutputMode::Human)
        .unwrap();
    assert_eq!(out, r#"[{"count":3},{"id":"T2"}]"#);
}

// ============================================================================
// JSON printer
// ============================================================================

#[test]
fn test_json_escaping() {
    let v = Value::from("tab\there \"quoted\" \u{1}");
    assert_eq!(to_json(&v), r#""tab\there \"quoted\" \u0001""#);
}

#[test]
fn test_pretty_json() {
    let v = Value::object([
        ("a", Value::Array(vec![Value::from(1), Value::from(2)])),
        ("b", Value::object([("c", Value::Null)])),
    ]);
    assert_eq!(
        to_json_pretty(&v),
        "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {\n    \"c\": null\n  }\n}"
    );
}

#[test]
fn test_non_finite_float_is_null() {
    assert_eq!(to_json(&Value::Float(f64::NAN)), "null");
    assert_eq!(to_json(&Value::Float(1.5)), "1.5");
}

// ============================================================================
// Compact and JSON carry the same data
// ============================================================================

fn row_strategy() -> impl Strategy<Value = Value> {
    ("[a-z ,\"\n]{0,8}", "[a-z ,\"\n]{0,8}", -1000i64..1000).prop_map(|(name, note, score)| {
        Value::object([
            ("name", Value::from(name)),
            ("note", Value::from(note)),
            ("score", Value::from(score)),
        ])
    })
}

/// Plain text a JSON scalar becomes in a table cell.
fn cell_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

proptest! {
    #[test]
    fn prop_compact_table_matches_json(rows in proptest::collection::vec(row_strategy(), 1..6)) {
        let value = Value::Array(rows);
        let columns = order(&["name", "note", "score"]);

        let table = format_compact(&value, &columns);
        let mut reader = csv::Reader::from_reader(table.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        prop_assert_eq!(&headers, &columns);
        let from_csv: Vec<Vec<(String, String)>> = reader
            .records()
            .map(|record| {
                let record = record.unwrap();
                headers
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect()
            })
            .collect();

        let decoded: serde_json::Value = serde_json::from_str(&to_json(&value)).unwrap();
        let from_json: Vec<Vec<(String, String)>> = decoded
            .as_array()
            .unwrap()
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|key| (key.clone(), cell_text(&row[key.as_str()])))
                    .collect()
            })
            .collect();

        prop_assert_eq!(from_csv, from_json);
    }
}
