//! # Edge Route Gate Middleware
//!
//! Runs before every gated request: resolves the session once, asks
//! [`dash_core::decide`] what to do, and either forwards the request with the
//! session attached as a [`ResolvedSession`] extension or answers with a
//! temporary redirect.
//!
//! Session lookup failures count as "no session", so protected pages fail
//! closed when the identity backend is down.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use dash_core::{decide, GateDecision};

use crate::auth::{resolve_session, ResolvedSession};
use crate::state::AppState;

/// Route gate middleware, mounted with `axum::middleware::from_fn_with_state`.
pub async fn route_gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = resolve_session(state.sessions.as_ref(), request.headers()).await;

    match decide(request.uri().path(), session.as_ref(), &state.routes) {
        GateDecision::Proceed => {
            request.extensions_mut().insert(ResolvedSession(session));
            next.run(request).await
        }
        GateDecision::Redirect(target) => {
            tracing::debug!(
                path = %request.uri().path(),
                redirect_to = target,
                authenticated = session.is_some(),
                "route gate redirect"
            );
            Redirect::temporary(target).into_response()
        }
    }
}
