//! # Todo Procedures
//!
//! Every operation is scoped to the session user: another user's todo is
//! reported as `NOT_FOUND`, never as `FORBIDDEN`, so ids don't leak.
//!
//! Writes go to Postgres first (when configured), then to the in-memory
//! store. A database failure surfaces as `INTERNAL` and leaves memory
//! untouched.

use anyhow::Context;
use chrono::Utc;
use dash_core::{AuthedContext, ProcedureError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db;
use crate::extractors::{decode_input, Validate};
use crate::state::{AppState, TodoRecord};

/// Longest accepted title, in characters.
pub const MAX_TITLE_LEN: usize = 255;

const TODO_NOT_FOUND: &str = "Todo not found";

/// Input of `todo.create`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoInput {
    pub title: String,
}

impl Validate for CreateTodoInput {
    fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Input of `todo.toggle`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleTodoInput {
    pub id: Uuid,
    pub completed: bool,
}

impl Validate for ToggleTodoInput {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Input of `todo.edit`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditTodoInput {
    pub id: Uuid,
    pub title: String,
}

impl Validate for EditTodoInput {
    fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Input of `todo.delete`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteTodoInput {
    pub id: Uuid,
}

impl Validate for DeleteTodoInput {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Output of `todo.create` and `todo.delete`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoId {
    pub id: Uuid,
}

fn validate_title(title: &str) -> Result<(), String> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err("title must not be empty".to_string());
    }
    if len > MAX_TITLE_LEN {
        return Err(format!("title must be at most {MAX_TITLE_LEN} characters"));
    }
    Ok(())
}

/// `todo.getAll` — the caller's todos, oldest first.
pub async fn get_all(ctx: AuthedContext<AppState>) -> anyhow::Result<Vec<TodoRecord>> {
    let owner = ctx.session.user_id();
    let mut todos: Vec<TodoRecord> = ctx
        .db
        .todos
        .list()
        .into_iter()
        .filter(|t| t.created_by == owner)
        .collect();
    todos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(todos)
}

/// `todo.create`
pub async fn create(ctx: AuthedContext<AppState>, input: Value) -> anyhow::Result<TodoId> {
    let input: CreateTodoInput = decode_input(input)?;
    let now = Utc::now();
    let record = TodoRecord {
        id: Uuid::new_v4(),
        created_by: ctx.session.user_id().to_string(),
        title: input.title.trim().to_string(),
        completed: false,
        created_at: now,
        updated_at: now,
    };

    if let Some(pool) = &ctx.db.db_pool {
        db::todos::insert(pool, &record).await.context("inserting todo")?;
    }
    ctx.db.todos.insert(record.id, record.clone());

    tracing::info!(todo_id = %record.id, user_id = %record.created_by, "todo created");
    Ok(TodoId { id: record.id })
}

/// `todo.toggle`
pub async fn toggle(ctx: AuthedContext<AppState>, input: Value) -> anyhow::Result<TodoRecord> {
    let input: ToggleTodoInput = decode_input(input)?;
    let owner = ctx.session.user_id();
    owned_todo(&ctx, input.id)?;
    let now = Utc::now();

    if let Some(pool) = &ctx.db.db_pool {
        let updated = db::todos::set_completed(pool, input.id, owner, input.completed, now)
            .await
            .context("updating todo")?;
        warn_if_missing(updated, input.id);
    }
    let todo = update_owned(&ctx.db, input.id, owner, |todo| {
        todo.completed = input.completed;
        todo.updated_at = now;
    })?;

    tracing::info!(todo_id = %todo.id, completed = todo.completed, "todo toggled");
    Ok(todo)
}

/// `todo.edit`
pub async fn edit(ctx: AuthedContext<AppState>, input: Value) -> anyhow::Result<TodoRecord> {
    let input: EditTodoInput = decode_input(input)?;
    let owner = ctx.session.user_id();
    owned_todo(&ctx, input.id)?;
    let title = input.title.trim().to_string();
    let now = Utc::now();

    if let Some(pool) = &ctx.db.db_pool {
        let updated = db::todos::set_title(pool, input.id, owner, &title, now)
            .await
            .context("updating todo")?;
        warn_if_missing(updated, input.id);
    }
    let todo = update_owned(&ctx.db, input.id, owner, |todo| {
        todo.title = title;
        todo.updated_at = now;
    })?;

    tracing::info!(todo_id = %todo.id, "todo edited");
    Ok(todo)
}

/// `todo.delete`
pub async fn delete(ctx: AuthedContext<AppState>, input: Value) -> anyhow::Result<TodoId> {
    let input: DeleteTodoInput = decode_input(input)?;
    let todo = owned_todo(&ctx, input.id)?;

    if let Some(pool) = &ctx.db.db_pool {
        db::todos::delete(pool, todo.id, &todo.created_by)
            .await
            .context("deleting todo")?;
    }
    let owner = ctx.session.user_id();
    ctx.db
        .todos
        .remove_if(&todo.id, |t| t.created_by == owner)
        .ok_or_else(|| ProcedureError::not_found(TODO_NOT_FOUND))?;

    tracing::info!(todo_id = %todo.id, user_id = %owner, "todo deleted");
    Ok(TodoId { id: todo.id })
}

/// Fetch a todo owned by the caller.
fn owned_todo(ctx: &AuthedContext<AppState>, id: Uuid) -> Result<TodoRecord, ProcedureError> {
    ctx.db
        .todos
        .get(&id)
        .filter(|t| t.created_by == ctx.session.user_id())
        .ok_or_else(|| ProcedureError::not_found(TODO_NOT_FOUND))
}

/// Apply `change` to the caller's todo under the store lock.
///
/// Only the fields `change` touches are written, so concurrent toggles and
/// edits of the same todo both survive.
fn update_owned(
    state: &AppState,
    id: Uuid,
    owner: &str,
    change: impl FnOnce(&mut TodoRecord),
) -> Result<TodoRecord, ProcedureError> {
    state
        .todos
        .try_update(&id, |current| {
            if current.created_by != owner {
                return Err(ProcedureError::not_found(TODO_NOT_FOUND));
            }
            change(current);
            Ok(current.clone())
        })
        .unwrap_or_else(|| Err(ProcedureError::not_found(TODO_NOT_FOUND)))
}

fn warn_if_missing(updated: bool, id: Uuid) {
    if !updated {
        tracing::warn!(todo_id = %id, "todo missing from database during update");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dash_core::{ProcedureErrorKind, Role, Session};
    use serde_json::json;

    fn ctx(state: &AppState, user: &str) -> AuthedContext<AppState> {
        AuthedContext {
            session: Session::new(user, Role::User, Utc::now() + Duration::hours(1)),
            db: state.clone(),
        }
    }

    fn kind_of(err: anyhow::Error) -> ProcedureErrorKind {
        err.downcast::<ProcedureError>().unwrap().kind()
    }

    #[test]
    fn title_rules() {
        assert!(validate_title("buy milk").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
        // Counted in characters, not bytes.
        assert!(validate_title(&"é".repeat(MAX_TITLE_LEN)).is_ok());
    }

    #[tokio::test]
    async fn create_trims_and_scopes_to_caller() {
        let state = AppState::new();
        let created = create(ctx(&state, "alice"), json!({ "title": "  buy milk " }))
            .await
            .unwrap();

        let stored = state.todos.get(&created.id).unwrap();
        assert_eq!(stored.title, "buy milk");
        assert_eq!(stored.created_by, "alice");
        assert!(!stored.completed);
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let state = AppState::new();
        let err = create(ctx(&state, "alice"), json!({ "title": " " }))
            .await
            .unwrap_err();
        assert_eq!(kind_of(err), ProcedureErrorKind::BadRequest);
        assert!(state.todos.is_empty());
    }

    #[tokio::test]
    async fn get_all_returns_only_callers_todos_in_order() {
        let state = AppState::new();
        let first = create(ctx(&state, "alice"), json!({ "title": "one" })).await.unwrap();
        create(ctx(&state, "bob"), json!({ "title": "not mine" })).await.unwrap();
        let second = create(ctx(&state, "alice"), json!({ "title": "two" })).await.unwrap();

        let todos = get_all(ctx(&state, "alice")).await.unwrap();
        let ids: Vec<Uuid> = todos.iter().map(|t| t.id).collect();
        assert_eq!(todos.len(), 2);
        assert!(ids.contains(&first.id) && ids.contains(&second.id));
        assert!(todos[0].created_at <= todos[1].created_at);
    }

    #[tokio::test]
    async fn toggle_and_edit_update_record() {
        let state = AppState::new();
        let created = create(ctx(&state, "alice"), json!({ "title": "draft" })).await.unwrap();

        let toggled = toggle(ctx(&state, "alice"), json!({ "id": created.id, "completed": true }))
            .await
            .unwrap();
        assert!(toggled.completed);

        let edited = edit(ctx(&state, "alice"), json!({ "id": created.id, "title": "final" }))
            .await
            .unwrap();
        assert_eq!(edited.title, "final");
        assert!(edited.completed);
        assert_eq!(state.todos.get(&created.id).unwrap(), edited);
    }

    #[tokio::test]
    async fn interleaved_toggle_and_edit_keep_both_changes() {
        let state = AppState::new();
        let created = create(ctx(&state, "alice"), json!({ "title": "a" })).await.unwrap();

        // Both requests read the todo before either writes.
        let seen_by_toggle = state.todos.get(&created.id).unwrap();
        let seen_by_edit = state.todos.get(&created.id).unwrap();
        assert_eq!(seen_by_toggle, seen_by_edit);

        update_owned(&state, created.id, "alice", |t| t.title = "b".to_string()).unwrap();
        update_owned(&state, created.id, "alice", |t| t.completed = true).unwrap();

        let stored = state.todos.get(&created.id).unwrap();
        assert_eq!(stored.title, "b");
        assert!(stored.completed);
    }

    #[tokio::test]
    async fn concurrent_toggle_and_edit_both_survive() {
        let state = AppState::new();
        let created = create(ctx(&state, "alice"), json!({ "title": "a" })).await.unwrap();

        let (toggled, edited) = tokio::join!(
            toggle(ctx(&state, "alice"), json!({ "id": created.id, "completed": true })),
            edit(ctx(&state, "alice"), json!({ "id": created.id, "title": "b" })),
        );
        toggled.unwrap();
        edited.unwrap();

        let stored = state.todos.get(&created.id).unwrap();
        assert_eq!(stored.title, "b");
        assert!(stored.completed);
    }

    #[test]
    fn update_owned_rejects_other_owner() {
        let state = AppState::new();
        let now = Utc::now();
        let todo = TodoRecord {
            id: Uuid::new_v4(),
            created_by: "alice".to_string(),
            title: "mine".to_string(),
            completed: false,
            created_at: now,
            updated_at: now,
        };
        state.todos.insert(todo.id, todo.clone());

        let err = update_owned(&state, todo.id, "bob", |t| t.completed = true).unwrap_err();
        assert_eq!(err.kind(), ProcedureErrorKind::NotFound);
        assert_eq!(state.todos.get(&todo.id).unwrap(), todo);

        let err = update_owned(&state, Uuid::new_v4(), "alice", |_| {}).unwrap_err();
        assert_eq!(err.kind(), ProcedureErrorKind::NotFound);
    }

    #[tokio::test]
    async fn other_users_todo_is_not_found() {
        let state = AppState::new();
        let created = create(ctx(&state, "alice"), json!({ "title": "private" })).await.unwrap();

        let err = toggle(ctx(&state, "bob"), json!({ "id": created.id, "completed": true }))
            .await
            .unwrap_err();
        assert_eq!(kind_of(err), ProcedureErrorKind::NotFound);

        let err = delete(ctx(&state, "bob"), json!({ "id": created.id }))
            .await
            .unwrap_err();
        assert_eq!(kind_of(err), ProcedureErrorKind::NotFound);
        assert_eq!(state.todos.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_owned_todo() {
        let state = AppState::new();
        let created = create(ctx(&state, "alice"), json!({ "title": "gone soon" })).await.unwrap();
        let deleted = delete(ctx(&state, "alice"), json!({ "id": created.id })).await.unwrap();
        assert_eq!(deleted.id, created.id);
        assert!(state.todos.is_empty());
    }

    #[tokio::test]
    async fn malformed_id_is_bad_request() {
        let state = AppState::new();
        let err = delete(ctx(&state, "alice"), json!({ "id": "not-a-uuid" }))
            .await
            .unwrap_err();
        assert_eq!(kind_of(err), ProcedureErrorKind::BadRequest);
    }
}
