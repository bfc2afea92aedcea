//! # Remote-Procedure Transport
//!
//! ```text
//! GET  /api/trpc/{procedure}?input=<json>   — queries
//! POST /api/trpc/{procedure}   <json body>  — mutations
//! ```
//!
//! Success is `200 {"result": {"data": <value>}}`; failures use the shared
//! [`ErrorBody`](crate::error::ErrorBody) shape.
//!
//! Input is parsed as JSON before the procedure wrapper runs, so malformed
//! input is `BAD_REQUEST` regardless of the caller's session. Typed decoding
//! happens inside the procedure, after the session check.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use dash_core::procedure::{admin, protected, public};
use dash_core::{ProcedureContext, ProcedureError, Session};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::ResolvedSession;
use crate::error::AppError;
use crate::extractors::{parse_body_input, parse_query_input};
use crate::routes::{admin as admin_routes, todo, user};
use crate::state::AppState;

/// How a procedure is invoked over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    /// `GET`, input in the query string.
    Query,
    /// `POST`, input in the body.
    Mutation,
}

/// Every procedure the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    HealthCheck,
    TodoGetAll,
    TodoCreate,
    TodoToggle,
    TodoEdit,
    TodoDelete,
    AdminTodos,
    UserMe,
}

impl Procedure {
    pub const ALL: [Procedure; 8] = [
        Self::HealthCheck,
        Self::TodoGetAll,
        Self::TodoCreate,
        Self::TodoToggle,
        Self::TodoEdit,
        Self::TodoDelete,
        Self::AdminTodos,
        Self::UserMe,
    ];

    /// Look a procedure up by its dotted path.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.path() == path)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::HealthCheck => "healthCheck",
            Self::TodoGetAll => "todo.getAll",
            Self::TodoCreate => "todo.create",
            Self::TodoToggle => "todo.toggle",
            Self::TodoEdit => "todo.edit",
            Self::TodoDelete => "todo.delete",
            Self::AdminTodos => "admin.todos",
            Self::UserMe => "user.me",
        }
    }

    pub fn kind(&self) -> ProcedureKind {
        match self {
            Self::HealthCheck | Self::TodoGetAll | Self::AdminTodos | Self::UserMe => {
                ProcedureKind::Query
            }
            Self::TodoCreate | Self::TodoToggle | Self::TodoEdit | Self::TodoDelete => {
                ProcedureKind::Mutation
            }
        }
    }
}

/// Success envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RpcResponse {
    pub result: RpcResult,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RpcResult {
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Query-string parameters of a query call.
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub input: Option<String>,
}

/// Build the RPC router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/trpc/:procedure", get(query).post(mutation))
}

/// GET /api/trpc/{procedure} — Run a query procedure.
#[utoipa::path(
    get,
    path = "/api/trpc/{procedure}",
    params(
        ("procedure" = String, Path, description = "Dotted procedure path, e.g. todo.getAll"),
        ("input" = Option<String>, Query, description = "JSON-encoded procedure input"),
    ),
    responses(
        (status = 200, description = "Procedure result", body = RpcResponse),
        (status = 400, description = "Malformed input", body = crate::error::ErrorBody),
        (status = 401, description = "No session", body = crate::error::ErrorBody),
        (status = 403, description = "Admin access required", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown procedure", body = crate::error::ErrorBody),
        (status = 405, description = "Procedure is a mutation", body = crate::error::ErrorBody),
    ),
    tag = "rpc"
)]
pub(crate) async fn query(
    State(state): State<AppState>,
    ResolvedSession(session): ResolvedSession,
    Path(path): Path<String>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<RpcResponse>, AppError> {
    let procedure = lookup(&path, ProcedureKind::Query)?;
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let input = parse_query_input(params.input.as_deref())?;
    respond(call(&state, session, procedure, input).await)
}

/// POST /api/trpc/{procedure} — Run a mutation procedure.
#[utoipa::path(
    post,
    path = "/api/trpc/{procedure}",
    params(
        ("procedure" = String, Path, description = "Dotted procedure path, e.g. todo.create"),
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Procedure result", body = RpcResponse),
        (status = 400, description = "Malformed input", body = crate::error::ErrorBody),
        (status = 401, description = "No session", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown procedure or todo", body = crate::error::ErrorBody),
        (status = 405, description = "Procedure is a query", body = crate::error::ErrorBody),
        (status = 500, description = "Unexpected failure", body = crate::error::ErrorBody),
    ),
    tag = "rpc"
)]
pub(crate) async fn mutation(
    State(state): State<AppState>,
    ResolvedSession(session): ResolvedSession,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<Json<RpcResponse>, AppError> {
    let procedure = lookup(&path, ProcedureKind::Mutation)?;
    let input = parse_body_input(&body)?;
    respond(call(&state, session, procedure, input).await)
}

fn lookup(path: &str, expected: ProcedureKind) -> Result<Procedure, AppError> {
    let procedure = Procedure::from_path(path)
        .ok_or_else(|| AppError::NotFound(format!("no procedure named {path:?}")))?;
    if procedure.kind() != expected {
        let kind = match procedure.kind() {
            ProcedureKind::Query => "query (use GET)",
            ProcedureKind::Mutation => "mutation (use POST)",
        };
        return Err(AppError::MethodNotSupported(format!("{path} is a {kind}")));
    }
    Ok(procedure)
}

fn respond(result: Result<Value, ProcedureError>) -> Result<Json<RpcResponse>, AppError> {
    let data = result?;
    Ok(Json(RpcResponse {
        result: RpcResult { data },
    }))
}

fn to_json<T: Serialize>(value: T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Run `procedure` with a fresh per-request context.
///
/// Every procedure goes through one of the wrappers in
/// [`dash_core::procedure`]; none of them sees the request directly.
pub async fn call(
    state: &AppState,
    session: Option<Session>,
    procedure: Procedure,
    input: Value,
) -> Result<Value, ProcedureError> {
    let ctx = ProcedureContext::new(session, state.clone());
    let path = procedure.path();
    let env = state.config.environment;

    match procedure {
        Procedure::HealthCheck => public(ctx, path, env, |_| async { to_json("OK") }).await,
        Procedure::TodoGetAll => {
            protected(ctx, path, env, |ctx| async move { to_json(todo::get_all(ctx).await?) })
                .await
        }
        Procedure::TodoCreate => {
            protected(ctx, path, env, |ctx| async move {
                to_json(todo::create(ctx, input).await?)
            })
            .await
        }
        Procedure::TodoToggle => {
            protected(ctx, path, env, |ctx| async move {
                to_json(todo::toggle(ctx, input).await?)
            })
            .await
        }
        Procedure::TodoEdit => {
            protected(ctx, path, env, |ctx| async move {
                to_json(todo::edit(ctx, input).await?)
            })
            .await
        }
        Procedure::TodoDelete => {
            protected(ctx, path, env, |ctx| async move {
                to_json(todo::delete(ctx, input).await?)
            })
            .await
        }
        Procedure::AdminTodos => {
            admin(ctx, path, env, |ctx| async move {
                to_json(admin_routes::todos(ctx).await?)
            })
            .await
        }
        Procedure::UserMe => {
            protected(ctx, path, env, |ctx| async move { to_json(user::me(ctx).await?) }).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dash_core::{ProcedureErrorKind, Role};
    use serde_json::json;

    fn session(user: &str, role: Role) -> Option<Session> {
        Some(Session::new(user, role, Utc::now() + Duration::hours(1)))
    }

    #[test]
    fn paths_round_trip() {
        for procedure in Procedure::ALL {
            assert_eq!(Procedure::from_path(procedure.path()), Some(procedure));
        }
        assert_eq!(Procedure::from_path("todo.nope"), None);
    }

    #[test]
    fn lookup_checks_kind() {
        assert!(lookup("todo.getAll", ProcedureKind::Query).is_ok());
        assert!(matches!(
            lookup("todo.create", ProcedureKind::Query),
            Err(AppError::MethodNotSupported(_))
        ));
        assert!(matches!(
            lookup("healthCheck", ProcedureKind::Mutation),
            Err(AppError::MethodNotSupported(_))
        ));
        assert!(matches!(
            lookup("missing", ProcedureKind::Query),
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn health_check_needs_no_session() {
        let state = AppState::new();
        let data = call(&state, None, Procedure::HealthCheck, Value::Null).await.unwrap();
        assert_eq!(data, json!("OK"));
    }

    #[tokio::test]
    async fn create_without_session_is_unauthorized_and_stores_nothing() {
        let state = AppState::new();
        let err = call(&state, None, Procedure::TodoCreate, json!({ "title": "x" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProcedureErrorKind::Unauthorized);
        assert!(state.todos.is_empty());
    }

    #[tokio::test]
    async fn admin_todos_forbidden_for_regular_user() {
        let state = AppState::new();
        let err = call(&state, session("bob", Role::User), Procedure::AdminTodos, Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProcedureErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn create_then_get_all() {
        let state = AppState::new();
        let created = call(
            &state,
            session("alice", Role::User),
            Procedure::TodoCreate,
            json!({ "title": "ship it" }),
        )
        .await
        .unwrap();
        assert!(created["id"].is_string());

        let all = call(&state, session("alice", Role::User), Procedure::TodoGetAll, Value::Null)
            .await
            .unwrap();
        assert_eq!(all[0]["title"], "ship it");
        assert_eq!(all[0]["createdBy"], "alice");
    }
}
