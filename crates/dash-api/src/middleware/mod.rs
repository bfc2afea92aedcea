//! # Middleware
//!
//! - `route_gate` — edge route gate for page navigation.
//! - `tracing_layer` — request spans.

pub mod route_gate;
pub mod tracing_layer;
