//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json` outside the route gate.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the RPC surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dashboard API",
        version = "0.1.0",
        description = "Session-gated dashboard: todo procedures, admin views and page descriptors.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::rpc::query,
        crate::routes::rpc::mutation,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::rpc::RpcResponse,
        crate::routes::rpc::RpcResult,
        crate::state::TodoRecord,
        crate::routes::todo::CreateTodoInput,
        crate::routes::todo::ToggleTodoInput,
        crate::routes::todo::EditTodoInput,
        crate::routes::todo::DeleteTodoInput,
        crate::routes::todo::TodoId,
        crate::routes::user::UserProfile,
        crate::routes::pages::PageDescriptor,
        crate::routes::pages::PageSection,
        crate::routes::pages::NavItem,
    )),
    tags(
        (name = "rpc", description = "Remote-procedure transport"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
