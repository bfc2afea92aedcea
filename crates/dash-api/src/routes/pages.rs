//! # Page Descriptors
//!
//! Browser-facing routes. Each answers with a JSON description of the page
//! (title, section, sidebar navigation, signed-in user) rather than markup.
//! All of them sit behind the route gate, so by the time a dashboard or
//! admin handler runs the caller's access has already been decided.

use axum::routing::get;
use axum::{Json, Router};
use dash_core::Session;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::ResolvedSession;
use crate::routes::user::UserProfile;
use crate::state::AppState;

/// Which layout a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PageSection {
    Public,
    Dashboard,
    Admin,
}

/// One sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavItem {
    pub title: String,
    pub url: String,
    /// Whether this entry points at the current page.
    pub active: bool,
}

/// JSON body of a page route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageDescriptor {
    pub title: String,
    pub path: String,
    pub section: PageSection,
    pub navigation: Vec<NavItem>,
    pub user: Option<UserProfile>,
}

struct Page {
    path: &'static str,
    title: &'static str,
    section: PageSection,
}

const PAGES: &[Page] = &[
    Page {
        path: "/",
        title: "Home",
        section: PageSection::Public,
    },
    Page {
        path: "/login",
        title: "Sign in",
        section: PageSection::Public,
    },
    Page {
        path: "/signup",
        title: "Sign up",
        section: PageSection::Public,
    },
    Page {
        path: "/dashboard",
        title: "Home",
        section: PageSection::Dashboard,
    },
    Page {
        path: "/dashboard/todo",
        title: "Todo",
        section: PageSection::Dashboard,
    },
    Page {
        path: "/dashboard/settings",
        title: "Settings",
        section: PageSection::Dashboard,
    },
    Page {
        path: "/admin",
        title: "Overview",
        section: PageSection::Admin,
    },
    Page {
        path: "/admin/users",
        title: "Users",
        section: PageSection::Admin,
    },
    Page {
        path: "/admin/analytics",
        title: "Analytics",
        section: PageSection::Admin,
    },
    Page {
        path: "/admin/settings",
        title: "Settings",
        section: PageSection::Admin,
    },
];

const MAIN_NAVIGATION: &[(&str, &str)] = &[
    ("Home", "/dashboard"),
    ("Todo", "/dashboard/todo"),
    ("Settings", "/dashboard/settings"),
];

const ADMIN_NAVIGATION: &[(&str, &str)] = &[
    ("Overview", "/admin"),
    ("Users", "/admin/users"),
    ("Analytics", "/admin/analytics"),
    ("Settings", "/admin/settings"),
];

/// Build the pages router.
pub fn router() -> Router<AppState> {
    PAGES.iter().fold(Router::new(), |router, page| {
        router.route(
            page.path,
            get(move |ResolvedSession(session): ResolvedSession| async move {
                Json(page.describe(session.as_ref()))
            }),
        )
    })
}

impl Page {
    fn describe(&self, session: Option<&Session>) -> PageDescriptor {
        let user = session.map(UserProfile::from_session);
        let navigation = match self.section {
            PageSection::Public => Vec::new(),
            PageSection::Dashboard => {
                let mut items = nav_items(MAIN_NAVIGATION, self.path);
                if user.as_ref().is_some_and(UserProfile::is_admin) {
                    items.push(nav_item("Admin Panel", "/admin", self.path));
                }
                items
            }
            PageSection::Admin => {
                let mut items = nav_items(ADMIN_NAVIGATION, self.path);
                items.push(nav_item("Back to Dashboard", "/dashboard", self.path));
                items
            }
        };

        PageDescriptor {
            title: self.title.to_string(),
            path: self.path.to_string(),
            section: self.section,
            navigation,
            user,
        }
    }
}

fn nav_items(entries: &[(&str, &str)], current: &str) -> Vec<NavItem> {
    entries
        .iter()
        .map(|(title, url)| nav_item(title, url, current))
        .collect()
}

fn nav_item(title: &str, url: &str, current: &str) -> NavItem {
    NavItem {
        title: title.to_string(),
        url: url.to_string(),
        active: url == current,
    }
}
