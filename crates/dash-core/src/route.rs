//! # Route Classification
//!
//! Static table mapping URL path prefixes to the access level they require.
//! Classification is total: a path no rule covers is [`AccessLevel::Public`].
//!
//! Prefixes match on whole path segments, longest prefix first:
//!
//! ```text
//! /dashboard          → covers /dashboard, /dashboard/todo, /dashboard/a/b
//!                       does not cover /dashboards
//! /dashboard/public   → overrides /dashboard for its own subtree
//! ```
//!
//! Segment matching is stricter than a raw string-prefix test: a sibling
//! path such as `/dashboard-v2` or `/dashboards` is *not* covered by
//! `/dashboard` and classifies as public unless it gets its own rule. Add a
//! rule for every new top-level area that needs a session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the gate sends visitors who are not signed in.
pub const LOGIN_PATH: &str = "/login";

/// Where the gate sends signed-in visitors who may not stay on a page.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Access level a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessLevel {
    Public,
    Authenticated,
    AdminOnly,
}

impl AccessLevel {
    /// Parse a configuration label: `public`, `authenticated`, or
    /// `admin_only` / `adminOnly` (any case).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "authenticated" => Some(Self::Authenticated),
            "admin_only" | "adminonly" => Some(Self::AdminOnly),
            _ => None,
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::Public)
    }
}

/// A single `prefix → level` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub prefix: String,
    pub level: AccessLevel,
}

impl RouteRule {
    pub fn new(prefix: impl Into<String>, level: AccessLevel) -> Self {
        Self {
            prefix: prefix.into(),
            level,
        }
    }

    fn covers(&self, path: &str) -> bool {
        covers_segment(&self.prefix, path)
    }
}

/// Errors building a [`RouteTable`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    /// Prefixes and auth pages must be absolute paths.
    #[error("route path must start with '/': {0:?}")]
    NotAbsolute(String),

    /// Two rules for the same prefix would make classification ambiguous.
    #[error("duplicate route prefix: {0}")]
    DuplicatePrefix(String),
}

/// Ordered prefix table plus the set of auth-only pages.
///
/// Rules are kept sorted longest-prefix-first so the first covering rule is
/// the most specific one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    auth_pages: Vec<String>,
}

impl RouteTable {
    /// Build a table from rules and auth-only pages (login, signup, ...).
    pub fn new(
        rules: Vec<RouteRule>,
        auth_pages: Vec<String>,
    ) -> Result<Self, RouteTableError> {
        let mut normalized: Vec<RouteRule> = Vec::with_capacity(rules.len());
        for rule in rules {
            let prefix = normalize_declared(&rule.prefix)?;
            if normalized.iter().any(|r| r.prefix == prefix) {
                return Err(RouteTableError::DuplicatePrefix(prefix));
            }
            normalized.push(RouteRule::new(prefix, rule.level));
        }
        normalized.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        let auth_pages = auth_pages
            .iter()
            .map(|p| normalize_declared(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules: normalized,
            auth_pages,
        })
    }

    /// Access level required by `path`.
    pub fn classify(&self, path: &str) -> AccessLevel {
        let path = normalize_request_path(path);
        self.rules
            .iter()
            .find(|rule| rule.covers(path))
            .map(|rule| rule.level)
            .unwrap_or(AccessLevel::Public)
    }

    /// Whether `path` is a page only signed-out visitors should see.
    pub fn is_auth_page(&self, path: &str) -> bool {
        let path = normalize_request_path(path);
        self.auth_pages.iter().any(|page| page == path)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn auth_pages(&self) -> &[String] {
        &self.auth_pages
    }
}

impl Default for RouteTable {
    /// `/dashboard` needs a session, `/admin` needs an admin session,
    /// `/login` and `/signup` are for signed-out visitors.
    fn default() -> Self {
        Self {
            rules: vec![
                RouteRule::new("/dashboard", AccessLevel::Authenticated),
                RouteRule::new("/admin", AccessLevel::AdminOnly),
            ],
            auth_pages: vec![LOGIN_PATH.to_string(), "/signup".to_string()],
        }
    }
}

fn normalize_declared(path: &str) -> Result<String, RouteTableError> {
    if !path.starts_with('/') {
        return Err(RouteTableError::NotAbsolute(path.to_string()));
    }
    Ok(normalize_request_path(path).to_string())
}

/// Drop trailing slashes, keeping the root as `/`.
fn normalize_request_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn covers_segment(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
