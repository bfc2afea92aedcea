//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Procedure failures keep the kind and message chosen by the procedure
//! layer; the underlying cause never reaches the response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dash_core::{ProcedureError, ProcedureErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "UNAUTHORIZED", "NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// No route for the requested path (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request could not be decoded before reaching a procedure (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Query called as mutation or the other way round (405).
    #[error("method not supported: {0}")]
    MethodNotSupported(String),

    /// Structured failure from the procedure layer.
    #[error(transparent)]
    Procedure(#[from] ProcedureError),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::MethodNotSupported(_) => {
                (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_SUPPORTED")
            }
            Self::Procedure(err) => (procedure_status(err.kind()), err.kind().code()),
        }
    }
}

fn procedure_status(kind: ProcedureErrorKind) -> StatusCode {
    match kind {
        ProcedureErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ProcedureErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ProcedureErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ProcedureErrorKind::NotFound => StatusCode::NOT_FOUND,
        ProcedureErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Procedure errors already carry a client-safe message and were
        // logged by the procedure layer.
        let message = match &self {
            Self::Procedure(err) => err.message().to_string(),
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}
