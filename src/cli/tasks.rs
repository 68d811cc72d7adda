//! The demo task-tracker domain served by `taskq`.
//!
//! Records live in an in-memory [`TaskStore`]. The schema's loader returns a
//! snapshot of the store on every call, so a read later in a batch sees the
//! writes made by mutations earlier in the same batch.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{
    Map, MutationContext, MutationMetadata, OperationContext, OperationMetadata, ParameterDef,
    QueryError, Schema, SchemaConfig, Value, count_items,
};

const STATUSES: [&str; 3] = ["todo", "in-progress", "done"];
const PRIORITIES: [&str; 3] = ["low", "medium", "high"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub description: String,
}

impl Task {
    fn new(id: &str, name: &str, status: &str, assignee: &str, priority: &str, description: &str) -> Self {
        Task {
            id: id.to_string(),
            name: name.to_string(),
            status: status.to_string(),
            assignee: assignee.to_string(),
            priority: priority.to_string(),
            description: description.to_string(),
        }
    }

    /// The shape mutations answer with.
    fn summary(&self) -> Value {
        Value::object([
            ("id", self.id.as_str()),
            ("title", self.name.as_str()),
            ("status", self.status.as_str()),
            ("assignee", self.assignee.as_str()),
            ("priority", self.priority.as_str()),
        ])
    }
}

/// The eight tasks the demo starts with.
pub fn seed_tasks() -> Vec<Task> {
    vec![
        Task::new("task-1", "Auth service refactor", "in-progress", "alice", "high", "Refactor auth to use JWT tokens"),
        Task::new("task-2", "Dashboard performance", "todo", "bob", "medium", "Optimize dashboard load time to under 2s"),
        Task::new("task-3", "Fix login redirect bug", "done", "alice", "high", "Users get stuck on /callback after OAuth"),
        Task::new("task-4", "Add dark mode", "done", "carol", "low", "Implement dark mode toggle in settings"),
        Task::new("task-5", "Pagination API", "in-progress", "dave", "medium", "Add cursor-based pagination to list endpoints"),
        Task::new("task-6", "CI pipeline speedup", "todo", "", "medium", "Reduce CI build time from 12min to under 5min"),
        Task::new("task-7", "Write onboarding docs", "done", "carol", "low", "New developer onboarding guide"),
        Task::new("task-8", "Rate limiter middleware", "in-progress", "bob", "high", "Add per-user rate limiting to public API"),
    ]
}

#[derive(Debug)]
struct StoreState {
    tasks: Vec<Task>,
    next_n: usize,
}

/// Shared handle to the in-memory task list. Clones point at the same store.
#[derive(Debug, Clone)]
pub struct TaskStore {
    inner: Rc<RefCell<StoreState>>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(seed_tasks())
    }
}

impl TaskStore {
    /// New IDs continue after the highest existing `task-N`.
    pub fn new(tasks: Vec<Task>) -> Self {
        let next_n = tasks
            .iter()
            .filter_map(|t| t.id.strip_prefix("task-")?.parse::<usize>().ok())
            .max()
            .map_or(1, |n| n + 1);
        TaskStore {
            inner: Rc::new(RefCell::new(StoreState { tasks, next_n })),
        }
    }

    /// Seed from a JSON array of tasks.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.inner.borrow().tasks.clone()
    }

    fn insert(&self, mut task: Task) -> Task {
        let mut state = self.inner.borrow_mut();
        task.id = format!("task-{}", state.next_n);
        state.next_n += 1;
        state.tasks.push(task.clone());
        task
    }

    fn update<F>(&self, id: &str, apply: F) -> Result<Task, QueryError>
    where
        F: FnOnce(&mut Task),
    {
        let mut state = self.inner.borrow_mut();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        apply(task);
        Ok(task.clone())
    }

    fn remove(&self, id: &str) -> Result<Task, QueryError> {
        let mut state = self.inner.borrow_mut();
        let idx = state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        Ok(state.tasks.remove(idx))
    }
}

fn not_found(id: &str) -> QueryError {
    QueryError::not_found(format!("task {:?} not found", id)).with_detail("id", id)
}

fn priority_rank(priority: &str) -> usize {
    PRIORITIES
        .iter()
        .position(|p| p.eq_ignore_ascii_case(priority))
        .unwrap_or(PRIORITIES.len())
}

fn compare_priority(a: &Task, b: &Task) -> Ordering {
    priority_rank(&a.priority)
        .cmp(&priority_rank(&b.priority))
        .then_with(|| a.priority.cmp(&b.priority))
}

/// Register the task domain on a fresh schema backed by `store`.
pub fn build_schema(store: &TaskStore, config: SchemaConfig) -> Schema<Task> {
    let mut schema = Schema::with_config(config);

    schema
        .field("id", |t: &Task| t.id.clone())
        .field("name", |t: &Task| t.name.clone())
        .field("status", |t: &Task| t.status.clone())
        .field("assignee", |t: &Task| t.assignee.clone())
        .field("priority", |t: &Task| t.priority.clone())
        .field("description", |t: &Task| t.description.clone());

    schema
        .preset("minimal", ["id", "status"])
        .preset("default", ["id", "name", "status"])
        .preset("overview", ["id", "name", "status", "assignee", "priority"])
        .preset(
            "full",
            ["id", "name", "status", "assignee", "priority", "description"],
        )
        .default_fields(["default"]);

    schema
        .filterable_field("status", |t: &Task| t.status.clone())
        .filterable_field("assignee", |t: &Task| t.assignee.clone())
        .filterable_field("priority", |t: &Task| t.priority.clone());

    schema
        .sortable_field("id", |t: &Task| t.id.clone())
        .sortable_field("name", |t: &Task| t.name.clone())
        .sortable_field("status", |t: &Task| t.status.clone())
        .sortable_field("assignee", |t: &Task| t.assignee.clone())
        .sortable_field_fn("priority", compare_priority);

    let loader_store = store.clone();
    schema.set_loader(move || Ok(loader_store.snapshot()));

    register_reads(&mut schema);
    register_mutations(&mut schema, store);
    schema
}

fn register_reads(schema: &mut Schema<Task>) {
    schema.operation_with_metadata(
        "get",
        get_task,
        OperationMetadata::new("Find a single task by ID")
            .param(ParameterDef::new("id", "string").with_description("Task ID (positional)"))
            .example("get(task-1) { overview }")
            .example("get(task-3) { full }"),
    );

    schema.operation_with_metadata(
        "list",
        list_tasks,
        OperationMetadata::new("List tasks with optional filters, sorting, and pagination")
            .param(filter_param("status"))
            .param(filter_param("assignee"))
            .param(filter_param("priority"))
            .param(
                ParameterDef::new("sort_<field>", "asc|desc")
                    .optional()
                    .with_description("Sort by field (id, name, status, assignee, priority)"),
            )
            .param(
                ParameterDef::new("skip", "int")
                    .optional()
                    .with_default(0)
                    .with_description("Skip first N items"),
            )
            .param(
                ParameterDef::new("take", "int")
                    .optional()
                    .with_description("Return at most N items"),
            )
            .example("list() { overview }")
            .example("list(status=done) { minimal }")
            .example("list(sort_name=asc) { overview }")
            .example("list(status=done, sort_name=desc, skip=0, take=2) { overview }"),
    );

    schema.operation_with_metadata(
        "count",
        count_tasks,
        OperationMetadata::new("Count tasks matching optional filters")
            .param(filter_param("status"))
            .param(filter_param("assignee"))
            .example("count()")
            .example("count(status=done)"),
    );

    schema.operation_with_metadata(
        "summary",
        summarize_tasks,
        OperationMetadata::new("Return counts grouped by status").example("summary()"),
    );
}

fn filter_param(name: &str) -> ParameterDef {
    ParameterDef::new(name, "string")
        .optional()
        .with_description(format!("Filter by {}", name))
}

fn get_task(ctx: &OperationContext<'_, Task>) -> Result<Value, QueryError> {
    let Some(id) = ctx.statement.first_positional() else {
        return Err(QueryError::validation("get requires a task ID argument"));
    };
    ctx.items()?
        .iter()
        .find(|t| t.id == id)
        .map(|t| Value::Object(ctx.selector.apply(t)))
        .ok_or_else(|| not_found(id))
}

fn list_tasks(ctx: &OperationContext<'_, Task>) -> Result<Value, QueryError> {
    let mut tasks = ctx.filter(ctx.items()?);
    ctx.sort(&mut tasks)?;
    let page = ctx.paginate(tasks)?;
    Ok(ctx.selector.apply_all(&page))
}

fn count_tasks(ctx: &OperationContext<'_, Task>) -> Result<Value, QueryError> {
    let tasks = ctx.items()?;
    let n = count_items(&tasks, |t| ctx.predicate.matches(t));
    Ok(Value::object([("count", n)]))
}

fn summarize_tasks(ctx: &OperationContext<'_, Task>) -> Result<Value, QueryError> {
    let tasks = ctx.items()?;
    let mut counts: Map = Map::new();
    for task in &tasks {
        let slot = counts.entry(task.status.clone()).or_insert(Value::Integer(0));
        if let Value::Integer(n) = slot {
            *n += 1;
        }
    }
    Ok(Value::object([
        ("total", Value::from(tasks.len())),
        ("counts", Value::Object(counts)),
    ]))
}

fn register_mutations(schema: &mut Schema<Task>, store: &TaskStore) {
    let s = store.clone();
    schema.mutation_with_metadata(
        "create",
        move |ctx: &MutationContext<'_, Task>| create_task(&s, ctx),
        MutationMetadata::new("Create a new task")
            .param(
                ParameterDef::new("title", "string")
                    .required()
                    .with_description("Task title"),
            )
            .param(
                ParameterDef::new("status", "string")
                    .with_enum(STATUSES)
                    .with_default("todo")
                    .with_description("Task status"),
            )
            .param(ParameterDef::new("assignee", "string").with_description("Assignee username"))
            .param(
                ParameterDef::new("priority", "string")
                    .with_enum(PRIORITIES)
                    .with_default("medium")
                    .with_description("Task priority"),
            )
            .example(r#"create(title="Fix login bug")"#)
            .example(r#"create(title="New feature", status=in-progress, assignee=alice, priority=high)"#),
    );

    let s = store.clone();
    schema.mutation_with_metadata(
        "update",
        move |ctx: &MutationContext<'_, Task>| update_task(&s, ctx),
        MutationMetadata::new("Update task fields by ID")
            .param(
                ParameterDef::new("id", "string")
                    .required()
                    .with_description("Task ID (positional)"),
            )
            .param(ParameterDef::new("title", "string").with_description("New title"))
            .param(
                ParameterDef::new("status", "string")
                    .with_enum(STATUSES)
                    .with_description("New status"),
            )
            .param(ParameterDef::new("assignee", "string").with_description("New assignee"))
            .param(
                ParameterDef::new("priority", "string")
                    .with_enum(PRIORITIES)
                    .with_description("New priority"),
            )
            .idempotent()
            .example("update(task-1, status=done)")
            .example(r#"update(task-1, title="New title", assignee=bob)"#),
    );

    let s = store.clone();
    schema.mutation_with_metadata(
        "delete",
        move |ctx: &MutationContext<'_, Task>| delete_task(&s, ctx),
        MutationMetadata::new("Delete a task by ID")
            .param(
                ParameterDef::new("id", "string")
                    .required()
                    .with_description("Task ID (positional)"),
            )
            .destructive()
            .idempotent()
            .example("delete(task-1)"),
    );
}

fn create_task(store: &TaskStore, ctx: &MutationContext<'_, Task>) -> Result<Value, QueryError> {
    let title = ctx.arg_default("title", "");
    if title.is_empty() {
        return Err(QueryError::validation("title is required").with_detail("field", "title"));
    }
    let status = match ctx.arg_default("status", "") {
        "" => "todo",
        s => s,
    };
    let priority = match ctx.arg_default("priority", "") {
        "" => "medium",
        p => p,
    };
    let assignee = ctx.arg_default("assignee", "");

    if ctx.dry_run {
        return Ok(Value::object([
            ("dry_run", Value::from(true)),
            (
                "would_create",
                Value::object([
                    ("title", title),
                    ("status", status),
                    ("assignee", assignee),
                    ("priority", priority),
                ]),
            ),
        ]));
    }

    let task = store.insert(Task::new("", title, status, assignee, priority, ""));
    Ok(task.summary())
}

const UPDATABLE: [&str; 4] = ["title", "status", "assignee", "priority"];

fn update_task(store: &TaskStore, ctx: &MutationContext<'_, Task>) -> Result<Value, QueryError> {
    let id = ctx.positional_arg();
    if id.is_empty() {
        return Err(QueryError::validation("update requires a task ID"));
    }

    if ctx.dry_run {
        let changes: Map = UPDATABLE
            .iter()
            .filter_map(|key| Some((key.to_string(), Value::from(ctx.arg_map.get(*key)?))))
            .collect();
        return Ok(Value::object([
            ("dry_run", Value::from(true)),
            ("id", Value::from(id)),
            ("would_update", Value::Object(changes)),
        ]));
    }

    let updated = store.update(id, |task| {
        for key in UPDATABLE {
            let Some(value) = ctx.arg_map.get(key) else {
                continue;
            };
            let slot = match key {
                "title" => &mut task.name,
                "status" => &mut task.status,
                "assignee" => &mut task.assignee,
                _ => &mut task.priority,
            };
            slot.clone_from(value);
        }
    })?;
    Ok(updated.summary())
}

fn delete_task(store: &TaskStore, ctx: &MutationContext<'_, Task>) -> Result<Value, QueryError> {
    let id = ctx.positional_arg();
    if id.is_empty() {
        return Err(QueryError::validation("delete requires a task ID"));
    }

    if ctx.dry_run {
        let tasks = ctx.items()?;
        let task = tasks.iter().find(|t| t.id == id).ok_or_else(|| not_found(id))?;
        return Ok(Value::object([
            ("dry_run", Value::from(true)),
            (
                "would_delete",
                Value::object([
                    ("id", task.id.as_str()),
                    ("title", task.name.as_str()),
                    ("status", task.status.as_str()),
                ]),
            ),
        ]));
    }

    let removed = store.remove(id)?;
    Ok(Value::object([
        ("deleted", Value::from(true)),
        ("id", Value::from(removed.id)),
        ("title", Value::from(removed.name)),
    ]))
}
