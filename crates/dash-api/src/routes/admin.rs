//! # Admin Procedures
//!
//! Cross-user views. Reachable only through the `admin` procedure wrapper,
//! which answers `FORBIDDEN` to signed-in non-admins.

use dash_core::AuthedContext;

use crate::state::{AppState, TodoRecord};

/// `admin.todos` — every todo across all users, oldest first.
pub async fn todos(ctx: AuthedContext<AppState>) -> anyhow::Result<Vec<TodoRecord>> {
    let mut todos = ctx.db.todos.list();
    todos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    tracing::debug!(admin_id = %ctx.session.user_id(), count = todos.len(), "admin listed todos");
    Ok(todos)
}
