//! # Sessions
//!
//! A [`Session`] is the proof of identity the external identity provider
//! resolves from request headers. The gates only read it: they never cache,
//! refresh, or mutate a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Role ────────────────────────────────────────────────────────────────────

/// Role label attached to a session user.
///
/// The identity provider stores roles as free-form labels. Only the exact
/// label `"admin"` grants [`Role::Admin`]; everything else, unknown labels
/// included, collapses to [`Role::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular signed-in user.
    User,
    /// Administrator with access to the admin panel.
    Admin,
}

impl Role {
    /// Map an identity-provider role label to a [`Role`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    /// Return the label the identity provider uses for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Session ─────────────────────────────────────────────────────────────────

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Identity-provider user id (opaque text).
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A resolved session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    /// When the identity provider stops honouring this session.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Convenience constructor used by session providers and tests.
    pub fn new(user_id: impl Into<String>, role: Role, expires_at: DateTime<Utc>) -> Self {
        let id = user_id.into();
        Self {
            user: SessionUser {
                name: id.clone(),
                email: String::new(),
                id,
                role,
            },
            expires_at,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    /// Whether the session has passed its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
