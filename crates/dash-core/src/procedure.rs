//! # Procedure Authorization Wrapper
//!
//! Wraps remote-procedure handlers with a session check and error
//! normalization.
//!
//! ```text
//! ProcedureContext { session: Option<Session>, db }
//!        │
//!        ├─ session absent ──────────────► UNAUTHORIZED (handler never runs)
//!        │
//!        ▼
//! AuthedContext { session, db } ─► handler ─► Ok(value) unchanged
//!                                         └─► Err(e)
//!                                               ├─ ProcedureError → logged, re-raised
//!                                               └─ anything else  → logged, INTERNAL
//! ```
//!
//! Handlers report failures through `anyhow::Result`. A handler that wants a
//! specific kind returns a [`ProcedureError`] converted into `anyhow::Error`;
//! the wrapper recovers it by downcast. Everything else counts as unexpected.
//!
//! Log detail is controlled by an injected [`Environment`]: the full debug
//! rendering (cause chain included) outside production, the message alone in
//! production.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{ProcedureError, ProcedureErrorKind};
use crate::session::Session;

/// Deployment environment, used to pick log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// `"production"` (any case) is production; everything else is development.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Per-request context handed to procedures.
///
/// `db` is the persistence handle; this module forwards it untouched.
#[derive(Debug, Clone)]
pub struct ProcedureContext<D> {
    pub session: Option<Session>,
    pub db: D,
}

impl<D> ProcedureContext<D> {
    pub fn new(session: Option<Session>, db: D) -> Self {
        Self { session, db }
    }
}

/// Context after the session check: the session is always present.
#[derive(Debug, Clone)]
pub struct AuthedContext<D> {
    pub session: Session,
    pub db: D,
}

/// Run `handler` only if the context carries a session.
pub async fn protected<D, T, F, Fut>(
    ctx: ProcedureContext<D>,
    path: &str,
    env: Environment,
    handler: F,
) -> Result<T, ProcedureError>
where
    F: FnOnce(AuthedContext<D>) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let result = match ctx.session {
        None => Err(anyhow::Error::from(ProcedureError::unauthorized())),
        Some(session) => handler(AuthedContext {
            session,
            db: ctx.db,
        })
        .await,
    };
    result.map_err(|err| normalize(path, env, err))
}

/// Like [`protected`], additionally requiring the admin role (`FORBIDDEN`
/// otherwise).
pub async fn admin<D, T, F, Fut>(
    ctx: ProcedureContext<D>,
    path: &str,
    env: Environment,
    handler: F,
) -> Result<T, ProcedureError>
where
    F: FnOnce(AuthedContext<D>) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    protected(ctx, path, env, |ctx| async move {
        if !ctx.session.is_admin() {
            return Err(ProcedureError::admin_required().into());
        }
        handler(ctx).await
    })
    .await
}

/// Run `handler` without a session requirement, still normalizing errors.
pub async fn public<D, T, F, Fut>(
    ctx: ProcedureContext<D>,
    path: &str,
    env: Environment,
    handler: F,
) -> Result<T, ProcedureError>
where
    F: FnOnce(ProcedureContext<D>) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    handler(ctx).await.map_err(|err| normalize(path, env, err))
}

/// Turn any handler failure into a structured error, logging it once.
pub fn normalize(path: &str, env: Environment, err: anyhow::Error) -> ProcedureError {
    match err.downcast::<ProcedureError>() {
        Ok(structured) => {
            log_failure(path, structured.kind(), &render_failure(&structured, env));
            structured
        }
        Err(raw) => {
            log_failure(path, ProcedureErrorKind::Internal, &render_failure(&raw, env));
            ProcedureError::internal(raw)
        }
    }
}

/// Text logged for a failure: debug rendering outside production, display
/// rendering in production.
pub fn render_failure<E>(err: &E, env: Environment) -> String
where
    E: fmt::Debug + fmt::Display + ?Sized,
{
    if env.is_production() {
        err.to_string()
    } else {
        format!("{err:?}")
    }
}

fn log_failure(path: &str, kind: ProcedureErrorKind, detail: &str) {
    match kind {
        ProcedureErrorKind::Internal => {
            tracing::error!(
                procedure = %path,
                code = kind.code(),
                error = %detail,
                "procedure failed"
            );
        }
        _ => {
            tracing::warn!(
                procedure = %path,
                code = kind.code(),
                error = %detail,
                "procedure rejected"
            );
        }
    }
}
