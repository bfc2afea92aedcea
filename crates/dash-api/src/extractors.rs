//! # Input Decoding & Validation
//!
//! Two stages. The transport parses the raw procedure input into a
//! [`serde_json::Value`] before any authorization runs, so malformed JSON
//! is a `BAD_REQUEST` even for callers without a session. Procedures then
//! decode that value into their typed input with [`decode_input`], which
//! also applies the [`Validate`] business rules.

use axum::body::Bytes;
use dash_core::ProcedureError;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

/// Trait for procedure inputs that carry business rules beyond what serde
/// deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Parse the `?input=` query parameter of a query call.
///
/// An absent or empty parameter is `null`.
pub fn parse_query_input(raw: Option<&str>) -> Result<Value, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Value::Null),
        Some(text) => serde_json::from_str(text)
            .map_err(|e| AppError::BadRequest(format!("malformed input: {e}"))),
    }
}

/// Parse the JSON body of a mutation call. An empty body is `null`.
pub fn parse_body_input(body: &Bytes) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("malformed input: {e}")))
}

/// Decode a procedure input and validate it.
///
/// Shape and rule violations are reported as `BAD_REQUEST`.
pub fn decode_input<T>(input: Value) -> anyhow::Result<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_value(input)
        .map_err(|e| ProcedureError::bad_request(format!("invalid input: {e}")))?;
    value.validate().map_err(ProcedureError::bad_request)?;
    Ok(value)
}
