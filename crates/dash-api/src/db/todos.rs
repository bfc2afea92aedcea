//! Todo persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `todos` table.
//! Ownership checks happen in the procedure layer; the `created_by`
//! predicate here keeps a stale id from touching another user's row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::TodoRecord;

/// Insert a new todo.
pub async fn insert(pool: &PgPool, record: &TodoRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO todos (id, created_by, title, completed, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.id)
    .bind(&record.created_by)
    .bind(&record.title)
    .bind(record.completed)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Set the completion flag of an owned todo.
///
/// Only `completed` and `updated_at` are written, so a concurrent title
/// edit is never overwritten. Returns whether a row was updated.
pub async fn set_completed(
    pool: &PgPool,
    id: Uuid,
    created_by: &str,
    completed: bool,
    updated_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE todos SET completed = $1, updated_at = $2
         WHERE id = $3 AND created_by = $4",
    )
    .bind(completed)
    .bind(updated_at)
    .bind(id)
    .bind(created_by)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Set the title of an owned todo. Returns whether a row was updated.
pub async fn set_title(
    pool: &PgPool,
    id: Uuid,
    created_by: &str,
    title: &str,
    updated_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE todos SET title = $1, updated_at = $2
         WHERE id = $3 AND created_by = $4",
    )
    .bind(title)
    .bind(updated_at)
    .bind(id)
    .bind(created_by)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete an owned todo. Returns whether a row was deleted.
pub async fn delete(pool: &PgPool, id: Uuid, created_by: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND created_by = $2")
        .bind(id)
        .bind(created_by)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all todos into memory on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<TodoRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TodoRow>(
        "SELECT id, created_by, title, completed, created_at, updated_at
         FROM todos ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(TodoRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct TodoRow {
    id: Uuid,
    created_by: String,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TodoRow {
    fn into_record(self) -> TodoRecord {
        TodoRecord {
            id: self.id,
            created_by: self.created_by,
            title: self.title,
            completed: self.completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
