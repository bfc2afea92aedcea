//! # Edge Route Gate
//!
//! Per-request allow/redirect decision made before any page or API handler
//! runs. The decision depends only on the request path, the route table and
//! the session (if any); it never fails. A session lookup that errored must
//! be passed in as `None` so protected paths fail closed.
//!
//! Rules, first match wins:
//!
//! 1. protected path, no session            → `/login`
//! 2. auth-only page, session present       → `/dashboard`
//! 3. admin path, no session                → `/login`
//!    admin path, session role is not admin → `/dashboard`
//! 4. anything else                         → proceed

use crate::route::{AccessLevel, RouteTable, DASHBOARD_PATH, LOGIN_PATH};
use crate::session::Session;

/// Outcome of the edge gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through to routing.
    Proceed,
    /// Terminate the request with a redirect to this path.
    Redirect(&'static str),
}

impl GateDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Decide whether a request for `path` may proceed.
pub fn decide(path: &str, session: Option<&Session>, table: &RouteTable) -> GateDecision {
    let level = table.classify(path);

    if session.is_none() && level.requires_session() {
        return GateDecision::Redirect(LOGIN_PATH);
    }

    if session.is_some() && table.is_auth_page(path) {
        return GateDecision::Redirect(DASHBOARD_PATH);
    }

    if level == AccessLevel::AdminOnly {
        match session {
            None => return GateDecision::Redirect(LOGIN_PATH),
            Some(s) if !s.is_admin() => return GateDecision::Redirect(DASHBOARD_PATH),
            Some(_) => {}
        }
    }

    GateDecision::Proceed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use chrono::{Duration, Utc};

    fn session(role: Role) -> Session {
        Session::new("user-1", role, Utc::now() + Duration::hours(1))
    }

    #[test]
    fn dashboard_without_session_goes_to_login() {
        let table = RouteTable::default();
        assert_eq!(
            decide("/dashboard/settings", None, &table),
            GateDecision::Redirect("/login")
        );
    }

    #[test]
    fn dashboard_with_session_proceeds() {
        let table = RouteTable::default();
        let user = session(Role::User);
        assert_eq!(
            decide("/dashboard/settings", Some(&user), &table),
            GateDecision::Proceed
        );
    }

    #[test]
    fn login_with_session_goes_to_dashboard() {
        let table = RouteTable::default();
        let user = session(Role::User);
        assert_eq!(
            decide("/login", Some(&user), &table),
            GateDecision::Redirect("/dashboard")
        );
        assert_eq!(
            decide("/signup", Some(&user), &table),
            GateDecision::Redirect("/dashboard")
        );
    }

    #[test]
    fn login_without_session_proceeds() {
        let table = RouteTable::default();
        assert!(decide("/login", None, &table).is_proceed());
        assert!(decide("/signup", None, &table).is_proceed());
    }

    #[test]
    fn admin_matrix() {
        let table = RouteTable::default();
        let user = session(Role::User);
        let admin = session(Role::Admin);
        assert_eq!(
            decide("/admin/users", None, &table),
            GateDecision::Redirect("/login")
        );
        assert_eq!(
            decide("/admin/users", Some(&user), &table),
            GateDecision::Redirect("/dashboard")
        );
        assert_eq!(
            decide("/admin/users", Some(&admin), &table),
            GateDecision::Proceed
        );
    }

    #[test]
    fn public_paths_proceed_either_way() {
        let table = RouteTable::default();
        let user = session(Role::User);
        assert!(decide("/", None, &table).is_proceed());
        assert!(decide("/", Some(&user), &table).is_proceed());
        assert!(decide("/health/liveness", None, &table).is_proceed());
    }

    #[test]
    fn admin_on_auth_page_still_redirected_to_dashboard() {
        let table = RouteTable::default();
        let admin = session(Role::Admin);
        assert_eq!(
            decide("/login", Some(&admin), &table),
            GateDecision::Redirect("/dashboard")
        );
    }
}
