//! # Edge Route Gate Properties
//!
//! Property tests over generated paths for the default route table, plus the
//! request scenarios the dashboard must handle.

use chrono::{Duration, Utc};
use proptest::prelude::*;

use dash_core::{decide, AccessLevel, GateDecision, Role, RouteTable, Session};

fn session(role: Role) -> Session {
    Session::new("user-42", role, Utc::now() + Duration::hours(1))
}

/// Zero to four extra path segments, e.g. `""`, `"/todo"`, `"/a/b-1"`.
fn sub_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9_-]{1,12}", 0..4).prop_map(|segments| {
        segments
            .into_iter()
            .map(|s| format!("/{s}"))
            .collect::<String>()
    })
}

/// Arbitrary absolute path, not necessarily under a known prefix.
fn any_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9._~-]{0,12}", 0..5)
        .prop_map(|segments| format!("/{}", segments.join("/")))
}

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Admin)]
}

proptest! {
    /// Protected prefix without a session always goes to login.
    #[test]
    fn dashboard_without_session_redirects_to_login(rest in sub_path()) {
        let table = RouteTable::default();
        let path = format!("/dashboard{rest}");
        prop_assert_eq!(decide(&path, None, &table), GateDecision::Redirect("/login"));
    }

    /// Protected prefix with any valid session always proceeds.
    #[test]
    fn dashboard_with_session_proceeds(rest in sub_path(), role in role()) {
        let table = RouteTable::default();
        let path = format!("/dashboard{rest}");
        let s = session(role);
        prop_assert_eq!(decide(&path, Some(&s), &table), GateDecision::Proceed);
    }

    /// Admin prefix: none → login, user → dashboard, admin → proceed.
    #[test]
    fn admin_prefix_matrix(rest in sub_path()) {
        let table = RouteTable::default();
        let path = format!("/admin{rest}");
        let user = session(Role::User);
        let admin = session(Role::Admin);
        prop_assert_eq!(decide(&path, None, &table), GateDecision::Redirect("/login"));
        prop_assert_eq!(decide(&path, Some(&user), &table), GateDecision::Redirect("/dashboard"));
        prop_assert_eq!(decide(&path, Some(&admin), &table), GateDecision::Proceed);
    }

    /// Auth pages: session → dashboard, none → proceed.
    #[test]
    fn auth_pages(page in prop_oneof![Just("/login"), Just("/signup")], role in role()) {
        let table = RouteTable::default();
        let s = session(role);
        prop_assert_eq!(decide(page, Some(&s), &table), GateDecision::Redirect("/dashboard"));
        prop_assert_eq!(decide(page, None, &table), GateDecision::Proceed);
    }

    /// Classification is total and consistent with the decision: a path the
    /// table calls public never redirects a signed-out visitor.
    #[test]
    fn classification_is_total(path in any_path()) {
        let table = RouteTable::default();
        let level = table.classify(&path);
        if level == AccessLevel::Public {
            prop_assert_eq!(decide(&path, None, &table), GateDecision::Proceed);
        } else {
            prop_assert_eq!(decide(&path, None, &table), GateDecision::Redirect("/login"));
        }
    }

    /// The gate only ever redirects to the two fixed targets.
    #[test]
    fn redirect_targets_are_fixed(path in any_path(), role in prop::option::of(role())) {
        let table = RouteTable::default();
        let s = role.map(session);
        match decide(&path, s.as_ref(), &table) {
            GateDecision::Proceed => {}
            GateDecision::Redirect(target) => {
                prop_assert!(target == "/login" || target == "/dashboard");
            }
        }
    }
}

// -- Scenarios ----------------------------------------------------------------

#[test]
fn scenario_dashboard_settings_without_session() {
    let table = RouteTable::default();
    assert_eq!(
        decide("/dashboard/settings", None, &table),
        GateDecision::Redirect("/login")
    );
}

#[test]
fn scenario_login_with_user_session() {
    let table = RouteTable::default();
    let user = session(Role::User);
    assert_eq!(
        decide("/login", Some(&user), &table),
        GateDecision::Redirect("/dashboard")
    );
}

#[test]
fn scenario_admin_users_with_user_session() {
    let table = RouteTable::default();
    let user = session(Role::User);
    assert_eq!(
        decide("/admin/users", Some(&user), &table),
        GateDecision::Redirect("/dashboard")
    );
}
