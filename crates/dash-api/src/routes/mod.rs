//! # Route Modules
//!
//! - `rpc` — `/api/trpc/{procedure}` transport and procedure dispatch.
//! - `todo` — the caller's todo list (`todo.*` procedures).
//! - `admin` — cross-user views (`admin.*` procedures).
//! - `user` — the signed-in user (`user.*` procedures).
//! - `pages` — page descriptors for browser navigation, behind the route gate.

pub mod admin;
pub mod pages;
pub mod rpc;
pub mod todo;
pub mod user;
