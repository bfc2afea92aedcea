//! # Procedure Error Taxonomy
//!
//! Every failure that leaves the procedure layer is a [`ProcedureError`]:
//! a kind, a user-facing message, and an optional underlying cause that is
//! kept for server-side logging only.
//!
//! | Kind           | Raised by                                  | Message                    |
//! |----------------|--------------------------------------------|----------------------------|
//! | `UNAUTHORIZED` | protected wrapper, no session              | `Authentication required`  |
//! | `FORBIDDEN`    | admin wrapper, role is not admin           | `Admin access required`    |
//! | `BAD_REQUEST`  | input decoding / validation                | validation detail          |
//! | `NOT_FOUND`    | unknown procedure, missing resource        | what was missing           |
//! | `INTERNAL`     | anything unstructured escaping a handler   | `Something went wrong`     |

use serde::{Deserialize, Serialize};

/// Message of the error raised when a session is required but absent.
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Message of the error raised when an admin role is required.
pub const ADMIN_REQUIRED: &str = "Admin access required";

/// Generic message for every unexpected failure.
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";

/// Kind of a structured procedure failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcedureErrorKind {
    Unauthorized,
    Forbidden,
    BadRequest,
    NotFound,
    Internal,
}

impl ProcedureErrorKind {
    /// Machine-readable code carried on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ProcedureErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Structured failure of a remote procedure.
///
/// `Display` renders the user-facing message only; the cause is reachable
/// through [`std::error::Error::source`] and [`ProcedureError::cause`].
#[derive(Debug)]
pub struct ProcedureError {
    kind: ProcedureErrorKind,
    message: String,
    cause: Option<anyhow::Error>,
}

impl ProcedureError {
    pub fn new(kind: ProcedureErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach an underlying cause.
    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// `UNAUTHORIZED` / "Authentication required", no cause.
    pub fn unauthorized() -> Self {
        Self::new(ProcedureErrorKind::Unauthorized, AUTHENTICATION_REQUIRED)
    }

    /// `FORBIDDEN` / "Admin access required".
    pub fn admin_required() -> Self {
        Self::new(ProcedureErrorKind::Forbidden, ADMIN_REQUIRED)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ProcedureErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProcedureErrorKind::NotFound, message)
    }

    /// `INTERNAL` / "Something went wrong" wrapping an unstructured failure.
    pub fn internal(cause: impl Into<anyhow::Error>) -> Self {
        Self::new(ProcedureErrorKind::Internal, SOMETHING_WENT_WRONG).with_cause(cause)
    }

    pub fn kind(&self) -> ProcedureErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }
}

impl std::fmt::Display for ProcedureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProcedureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|cause| {
            let cause: &(dyn std::error::Error + Send + Sync + 'static) = cause.as_ref();
            cause as &(dyn std::error::Error + 'static)
        })
    }
}
