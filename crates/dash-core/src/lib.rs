//! # dash-core — Access Control for the Dashboard Starter
//!
//! Framework-independent pieces of the dashboard backend's access control:
//!
//! - [`session`] — the externally resolved session and its role.
//! - [`route`] — the static route table (prefix → access level).
//! - [`gate`] — the edge route gate decision (proceed or redirect).
//! - [`error`] — the structured procedure error taxonomy.
//! - [`procedure`] — the procedure authorization wrapper.
//!
//! Nothing here holds state between requests. Sessions and persistence
//! handles arrive through explicit per-request values, which keeps every
//! gate testable in isolation.

pub mod error;
pub mod gate;
pub mod procedure;
pub mod route;
pub mod session;

pub use error::{ProcedureError, ProcedureErrorKind};
pub use gate::{decide, GateDecision};
pub use procedure::{AuthedContext, Environment, ProcedureContext};
pub use route::{AccessLevel, RouteRule, RouteTable, RouteTableError, DASHBOARD_PATH, LOGIN_PATH};
pub use session::{Role, Session, SessionUser};
