//! # Server Configuration
//!
//! Read once at startup from environment variables.
//!
//! | Variable              | Default                     | Meaning                   |
//! |-----------------------|-----------------------------|---------------------------|
//! | `PORT`                | `8080`                      | HTTP port                 |
//! | `APP_ENV`             | `development`               | `production`: terse logs  |
//! | `SESSION_COOKIE_NAME` | `better-auth.session_token` | session cookie            |
//! | `LOG_FORMAT`          | `text`                      | `json` for JSON lines     |
//! | `DEV_SESSIONS`        | unset                       | `role:user_id:token` list |
//! | `ROUTE_RULES`         | see below                   | `prefix=level` list       |
//! | `AUTH_PAGES`          | `/login,/signup`            | signed-out-only pages     |
//!
//! `ROUTE_RULES` defaults to `/dashboard=authenticated,/admin=admin_only`.
//! Levels are `public`, `authenticated` and `admin_only`.
//!
//! `DATABASE_URL` is read by [`crate::db::init_pool`].

use dash_core::{AccessLevel, Environment, RouteRule, RouteTable, RouteTableError};
use thiserror::Error;

/// Cookie name the identity provider uses by default.
pub const DEFAULT_SESSION_COOKIE: &str = "better-auth.session_token";

/// Errors reading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT value: {0:?}")]
    InvalidPort(String),

    #[error("invalid DEV_SESSIONS entry: {0}")]
    InvalidDevSession(String),

    #[error("invalid ROUTE_RULES entry: {0}")]
    InvalidRouteRule(String),

    #[error("invalid route table: {0}")]
    RouteTable(#[from] RouteTableError),
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration.
///
/// Custom `Debug` redacts the dev session list, which carries tokens.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    pub session_cookie: String,
    pub log_format: LogFormat,
    pub dev_sessions: Option<String>,
    pub routes: RouteTable,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("session_cookie", &self.session_cookie)
            .field("log_format", &self.log_format)
            .field("dev_sessions", &self.dev_sessions.as_ref().map(|_| "[REDACTED]"))
            .field("routes", &self.routes)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: Environment::Development,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            log_format: LogFormat::Text,
            dev_sessions: None,
            routes: RouteTable::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        let environment = var("APP_ENV")
            .map(|label| Environment::from_label(&label))
            .unwrap_or_default();

        let session_cookie = var("SESSION_COOKIE_NAME")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or(defaults.session_cookie);

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let dev_sessions = var("DEV_SESSIONS").filter(|s| !s.trim().is_empty());

        let routes = route_table(var("ROUTE_RULES"), var("AUTH_PAGES"), defaults.routes)?;

        Ok(Self {
            port,
            environment,
            session_cookie,
            log_format,
            dev_sessions,
            routes,
        })
    }
}

/// Build the route table from `ROUTE_RULES` / `AUTH_PAGES`, keeping the
/// default for whichever is unset.
fn route_table(
    rules: Option<String>,
    auth_pages: Option<String>,
    defaults: RouteTable,
) -> Result<RouteTable, ConfigError> {
    if rules.is_none() && auth_pages.is_none() {
        return Ok(defaults);
    }

    let rules = match rules {
        Some(spec) => parse_route_rules(&spec)?,
        None => defaults.rules().to_vec(),
    };
    let auth_pages = match auth_pages {
        Some(spec) => split_list(&spec).map(str::to_string).collect(),
        None => defaults.auth_pages().to_vec(),
    };

    Ok(RouteTable::new(rules, auth_pages)?)
}

/// Parse a `prefix=level` list, comma separated.
fn parse_route_rules(spec: &str) -> Result<Vec<RouteRule>, ConfigError> {
    split_list(spec)
        .map(|entry| -> Result<RouteRule, ConfigError> {
            let (prefix, label) = entry.split_once('=').ok_or_else(|| {
                ConfigError::InvalidRouteRule(format!("expected {{prefix}}={{level}}: {entry}"))
            })?;
            let level = AccessLevel::from_label(label).ok_or_else(|| {
                ConfigError::InvalidRouteRule(format!("unknown access level: {}", label.trim()))
            })?;
            Ok(RouteRule::new(prefix.trim(), level))
        })
        .collect()
}

fn split_list(spec: &str) -> impl Iterator<Item = &str> {
    spec.split(',').map(str::trim).filter(|e| !e.is_empty())
}
