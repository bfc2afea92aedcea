//! # Application State
//!
//! Shared state for the Axum application, passed to route handlers via the
//! `State` extractor and forwarded to procedures as their persistence handle.
//!
//! - **Todos** — in-memory store, written through to Postgres when a pool
//!   is configured and hydrated from it on startup.
//! - **Sessions** — the session-lookup backend used by the route gate and
//!   procedure context creation.
//! - **Routes** — the static route table consulted by the route gate.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dash_core::RouteTable;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{InMemorySessions, SessionLookup};
use crate::config::AppConfig;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot` and is never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Atomically read-validate-update a record.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Remove a record if `predicate` accepts it, under a single write lock.
    ///
    /// Returns the removed record; `None` if absent or rejected.
    pub fn remove_if(&self, id: &Uuid, predicate: impl FnOnce(&T) -> bool) -> Option<T> {
        let mut guard = self.data.write();
        if guard.get(id).map(predicate).unwrap_or(false) {
            guard.remove(id)
        } else {
            None
        }
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Records ------------------------------------------------------------------

/// A todo item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    pub id: Uuid,
    /// Identity-provider id of the owner.
    pub created_by: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- AppState -----------------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub todos: Store<TodoRecord>,
    /// When `Some`, todos are persisted to Postgres in addition to memory.
    pub db_pool: Option<PgPool>,
    pub sessions: Arc<dyn SessionLookup>,
    pub routes: Arc<RouteTable>,
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("todos", &self.todos.len())
            .field("db_pool", &self.db_pool.is_some())
            .field("routes", &self.routes)
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// In-memory state with default configuration and no sessions.
    pub fn new() -> Self {
        let config = AppConfig::default();
        let sessions = Arc::new(InMemorySessions::new(config.session_cookie.clone()));
        Self::with_sessions(config, sessions, None)
    }

    /// State with an explicit session backend and optional database pool.
    pub fn with_sessions(
        config: AppConfig,
        sessions: Arc<dyn SessionLookup>,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            todos: Store::new(),
            db_pool,
            sessions,
            routes: Arc::new(config.routes.clone()),
            config,
        }
    }

    /// Load persisted todos into the in-memory store.
    ///
    /// No-op without a database pool.
    pub async fn hydrate_from_db(&self) -> Result<usize, sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(0);
        };

        let todos = crate::db::todos::load_all(pool).await?;
        let count = todos.len();
        for record in todos {
            self.todos.insert(record.id, record);
        }

        tracing::info!(todos = count, "hydrated in-memory stores from database");
        Ok(count)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
