#![allow(dead_code)]

use agent_query::{OperationContext, QueryError, Schema, Value, count_items};

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: &'static str,
    pub name: &'static str,
    pub status: &'static str,
    pub score: i64,
    pub tags: Vec<&'static str>,
}

pub fn items() -> Vec<Item> {
    vec![
        Item {
            id: "T1",
            name: "alpha",
            status: "done",
            score: 10,
            tags: vec!["a", "b"],
        },
        Item {
            id: "T2",
            name: "beta",
            status: "todo",
            score: 5,
            tags: vec![],
        },
        Item {
            id: "T3",
            name: "gamma, the third",
            status: "Done",
            score: 7,
            tags: vec!["c"],
        },
    ]
}

fn get(ctx: &OperationContext<'_, Item>) -> Result<Value, QueryError> {
    let Some(id) = ctx.statement.first_positional() else {
        return Err(QueryError::validation("get requires an ID argument"));
    };
    ctx.items()?
        .iter()
        .find(|item| item.id == id)
        .map(|item| Value::Object(ctx.selector.apply(item)))
        .ok_or_else(|| QueryError::not_found(format!("item {:?} not found", id)))
}

fn list(ctx: &OperationContext<'_, Item>) -> Result<Value, QueryError> {
    let mut items = ctx.filter(ctx.items()?);
    ctx.sort(&mut items)?;
    let page = ctx.paginate(items)?;
    Ok(ctx.selector.apply_all(&page))
}

fn count(ctx: &OperationContext<'_, Item>) -> Result<Value, QueryError> {
    let items = ctx.items()?;
    Ok(Value::object([(
        "count",
        count_items(&items, |item| ctx.predicate.matches(item)),
    )]))
}

fn fail(_: &OperationContext<'_, Item>) -> Result<Value, QueryError> {
    Err(QueryError::internal("intentional failure"))
}

/// Fields `id name status score tags`, preset `basic`, defaults `id name`,
/// filter on `status`, sorts on `name` and `score`, and the operations
/// `get list count fail`.
pub fn schema() -> Schema<Item> {
    let mut s = Schema::new();
    s.field("id", |i: &Item| i.id)
        .field("name", |i: &Item| i.name)
        .field("status", |i: &Item| i.status)
        .field("score", |i: &Item| i.score)
        .field("tags", |i: &Item| i.tags.clone())
        .preset("basic", ["id", "name"])
        .default_fields(["id", "name"])
        .filterable_field("status", |i: &Item| i.status.to_string())
        .sortable_field("name", |i: &Item| i.name)
        .sortable_field("score", |i: &Item| i.score)
        .set_loader(|| Ok(items()))
        .operation("get", get)
        .operation("list", list)
        .operation("count", count)
        .operation("fail", fail);
    s
}

/// Run a query that must parse.
pub fn query(schema: &Schema<Item>, input: &str) -> Value {
    schema
        .query(input)
        .unwrap_or_else(|e| panic!("query {:?} failed to parse: {}", input, e))
}

pub fn json(value: &Value) -> serde_json::Value {
    serde_json::Value::from(value.clone())
}
