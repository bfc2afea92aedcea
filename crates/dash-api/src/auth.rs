//! # Session Lookup
//!
//! Resolves the caller's [`Session`] from request headers. Token issuance and
//! signature verification belong to the identity provider; this module only
//! finds the token and asks a [`SessionLookup`] backend about it.
//!
//! ## Token Sources (first match wins)
//!
//! ```text
//! Authorization: Bearer {token}
//! Cookie: {cookie_name}={token}.{signature}
//! Cookie: __Secure-{cookie_name}={token}.{signature}
//! ```
//!
//! ## Dev Sessions
//!
//! Without a database, sessions come from `DEV_SESSIONS`:
//!
//! ```text
//! {role}:{user_id}:{token}[,{role}:{user_id}:{token}...]
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use dash_core::{Role, Session, SessionUser};
use parking_lot::RwLock;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::ConfigError;
use crate::state::AppState;

// ── SessionToken ────────────────────────────────────────────────────────────

/// Opaque session token. Wiped from memory on drop; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Find the session token in `headers`.
///
/// A signed cookie value `token.signature` yields `token`.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
    {
        return Some(SessionToken::new(token));
    }

    let secure_name = format!("__Secure-{cookie_name}");
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name || *name == secure_name)
        .map(|(_, value)| value.split('.').next().unwrap_or_default().trim())
        .filter(|t| !t.is_empty())
        .map(SessionToken::new)
}

// ── SessionLookup ───────────────────────────────────────────────────────────

/// Errors from a session backend.
#[derive(Error, Debug)]
pub enum SessionLookupError {
    #[error("session store query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session backend unavailable: {0}")]
    Unavailable(String),
}

/// Session-lookup capability supplied by the identity provider.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// requests behind an `Arc`.
#[axum::async_trait]
pub trait SessionLookup: Send + Sync {
    /// Return the live session for these headers, or `None`.
    async fn get_session(&self, headers: &HeaderMap)
        -> Result<Option<Session>, SessionLookupError>;
}

/// Resolve a session, treating lookup failures as "no session".
///
/// Protected routes therefore fail closed when the backend is down.
pub async fn resolve_session(lookup: &dyn SessionLookup, headers: &HeaderMap) -> Option<Session> {
    match lookup.get_session(headers).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "session lookup failed; continuing without session");
            None
        }
    }
}

// ── In-memory sessions ──────────────────────────────────────────────────────

/// Session backend kept in process memory, for development and tests.
#[derive(Debug, Clone)]
pub struct InMemorySessions {
    cookie_name: String,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessions {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Build from a `role:user_id:token` list (comma separated).
    pub fn from_spec(cookie_name: impl Into<String>, spec: &str) -> Result<Self, ConfigError> {
        let store = Self::new(cookie_name);
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, session) = parse_dev_session(entry)?;
            store.insert(token, session);
        }
        Ok(store)
    }

    /// Register `session` under `token`, replacing any previous one.
    pub fn insert(&self, token: SessionToken, session: Session) {
        self.sessions.write().insert(token.as_str().to_string(), session);
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[axum::async_trait]
impl SessionLookup for InMemorySessions {
    async fn get_session(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<Session>, SessionLookupError> {
        let Some(token) = extract_token(headers, &self.cookie_name) else {
            return Ok(None);
        };
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .get(token.as_str())
            .filter(|s| !s.is_expired_at(now))
            .cloned())
    }
}

/// Parse one `role:user_id:token` entry.
fn parse_dev_session(entry: &str) -> Result<(SessionToken, Session), ConfigError> {
    let parts: Vec<&str> = entry.splitn(3, ':').collect();
    let [role, user_id, token] = parts.as_slice() else {
        return Err(ConfigError::InvalidDevSession(
            "expected {role}:{user_id}:{token}".to_string(),
        ));
    };
    if user_id.is_empty() {
        return Err(ConfigError::InvalidDevSession("empty user_id".to_string()));
    }
    if token.is_empty() {
        return Err(ConfigError::InvalidDevSession(format!(
            "empty token for user {user_id}"
        )));
    }
    let role = match *role {
        "admin" => Role::Admin,
        "user" => Role::User,
        other => {
            return Err(ConfigError::InvalidDevSession(format!(
                "unknown role: {other}"
            )))
        }
    };

    let session = Session {
        user: SessionUser {
            id: user_id.to_string(),
            name: user_id.to_string(),
            email: format!("{user_id}@localhost"),
            role,
        },
        expires_at: DateTime::<Utc>::MAX_UTC,
    };
    Ok((SessionToken::new(*token), session))
}

// ── Extractor ───────────────────────────────────────────────────────────────

/// The request's session (if any), as resolved by the route gate.
///
/// When the route gate did not run for this request, the session is looked
/// up on the spot with the same fail-closed rule.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSession(pub Option<Session>);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for ResolvedSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<ResolvedSession>() {
            return Ok(resolved.clone());
        }
        let session = resolve_session(state.sessions.as_ref(), &parts.headers).await;
        Ok(Self(session))
    }
}
