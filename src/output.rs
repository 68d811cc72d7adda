//! Result serialization.
//!
//! Two encodings are supported, selected by [`OutputMode`]:
//!
//! - **Human**: plain JSON via [`to_json()`] (or [`to_json_pretty()`] for
//!   search results). Object keys are always sorted, so output is
//!   deterministic.
//! - **Compact**: a token-minimized text form via [`format_compact()`]. Lists
//!   of objects become a CSV-style table with a single header row, single
//!   objects become `key:value` lines, everything else falls back to JSON.
//!
//! # Examples
//!
//! ```
//! use agent_query::Value;
//! use agent_query::output::{format_compact, to_json};
//!
//! let rows = Value::Array(vec![Value::object([("id", "T1"), ("name", "a,b")])]);
//! assert_eq!(to_json(&rows), r#"[{"id":"T1","name":"a,b"}]"#);
//!
//! let order = vec!["id".to_string(), "name".to_string()];
//! assert_eq!(format_compact(&rows, &order), "id,name\nT1,\"a,b\"\n");
//! ```

use std::str::FromStr;

use serde::Serialize;

use crate::error::QueryError;
use crate::value::{Map, Value};

/// How query and search results are serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Standard JSON
    #[default]
    Human,

    /// Tabular / key-value text tuned for LLM token efficiency
    Compact,
}

impl FromStr for OutputMode {
    type Err = QueryError;

    /// Accepts `json`, `compact` and `llm`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputMode::Human),
            "compact" | "llm" => Ok(OutputMode::Compact),
            _ => Err(QueryError::validation(format!(
                "unknown format {:?}: use \"json\", \"compact\", or \"llm\"",
                s
            ))
            .with_detail("format", s)),
        }
    }
}

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) if n.is_finite() => n.to_string(),
            // JSON has no NaN or infinity.
            Value::Float(_) => "null".to_string(),
            Value::String(s) => format!("\"{}\"", self.escape_string(s)),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(obj) => self.print_object(obj, indent),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        if self.pretty {
            let items: Vec<String> = arr
                .iter()
                .map(|v| {
                    format!(
                        "{}{}",
                        self.indent(indent + 1),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            format!("[\n{}\n{}]", items.join(",\n"), self.indent(indent))
        } else {
            let items: Vec<String> = arr.iter().map(|v| self.print_value(v, indent)).collect();
            format!("[{}]", items.join(","))
        }
    }

    fn print_object(&self, obj: &Map, indent: usize) -> String {
        if obj.is_empty() {
            return "{}".to_string();
        }

        if self.pretty {
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}\"{}\": {}",
                        self.indent(indent + 1),
                        self.escape_string(k),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            format!("{{\n{}\n{}}}", items.join(",\n"), self.indent(indent))
        } else {
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| format!("\"{}\":{}", self.escape_string(k), self.print_value(v, indent)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn escape_string(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out
    }
}

/// Converts a Value to compact JSON.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to JSON with 2-space indentation.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}

/// Render a result in the compact encoding.
///
/// `field_order` gives the column order for tables and the line order for
/// single objects. When it is empty (or, for a single object, shares no key
/// with it) the object's sorted keys are used instead.
pub fn format_compact(value: &Value, field_order: &[String]) -> String {
    match value {
        Value::Array(items) => {
            let rows: Option<Vec<&Map>> = items.iter().map(Value::as_object).collect();
            match rows {
                Some(rows) => format_table(&rows, field_order),
                None => to_json(value),
            }
        }
        Value::Object(obj) if !obj.contains_key("error") => format_single(obj, field_order),
        _ => to_json(value),
    }
}

/// Join per-statement compact renderings with a blank line between them.
pub fn join_compact<I>(parts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    parts
        .into_iter()
        .map(|mut part| {
            if !part.ends_with('\n') {
                part.push('\n');
            }
            part
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_table(rows: &[&Map], field_order: &[String]) -> String {
    let derived: Vec<String>;
    let order: &[String] = match (field_order.is_empty(), rows.first()) {
        (true, Some(first)) => {
            derived = first.keys().cloned().collect();
            &derived
        }
        _ => field_order,
    };

    let mut out = order.join(",");
    out.push('\n');
    for row in rows {
        let cells: Vec<String> = order
            .iter()
            .map(|field| escape_csv(row.get(field).unwrap_or(&Value::Null)))
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn format_single(obj: &Map, field_order: &[String]) -> String {
    let overlaps = field_order.iter().any(|f| obj.contains_key(f));
    let keys: Vec<&String> = if overlaps {
        field_order.iter().collect()
    } else {
        obj.keys().collect()
    };

    let mut out = String::new();
    for key in keys {
        out.push_str(key);
        out.push(':');
        out.push_str(&escape_kv(obj.get(key).unwrap_or(&Value::Null)));
        out.push('\n');
    }
    out
}

/// CSV cell: quoted (with doubled inner quotes) when the text contains a
/// comma, quote or line break.
pub fn escape_csv(value: &Value) -> String {
    let s = value.to_plain_string();
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s
    }
}

/// Value half of a `key:value` line, with line breaks escaped.
pub fn escape_kv(value: &Value) -> String {
    value
        .to_plain_string()
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
