//! # dash-api — Session-Gated Dashboard Server
//!
//! Axum server around the framework-independent gates in `dash-core`.
//!
//! ## Surface
//!
//! | Path                     | Module              | Gate                      |
//! |--------------------------|---------------------|---------------------------|
//! | `/`, `/login`, `/signup` | [`routes::pages`]   | route gate (auth pages)   |
//! | `/dashboard/*`           | [`routes::pages`]   | route gate (session)      |
//! | `/admin/*`               | [`routes::pages`]   | route gate (admin)        |
//! | `/api/trpc/{procedure}`  | [`routes::rpc`]     | procedure wrapper         |
//! | `/health/*`              | this module         | none                      |
//! | `/openapi.json`          | [`openapi`]         | none                      |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → RouteGate → Handler
//! ```
//!
//! The route gate resolves the session once per request and hands it to
//! handlers as a [`auth::ResolvedSession`] extension.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn_with_state;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health checks and the OpenAPI document are mounted outside the route
/// gate so they remain reachable without a session.
pub fn app(state: AppState) -> Router {
    let gated = Router::new()
        .merge(routes::pages::router())
        .merge(routes::rpc::router())
        .fallback(not_found)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::route_gate::route_gate_middleware,
        ));

    let open = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .merge(openapi::router());

    Router::new()
        .merge(open)
        .merge(gated)
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

/// Liveness check: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
