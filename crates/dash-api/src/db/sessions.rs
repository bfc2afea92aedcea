//! Session lookup against the identity provider's tables.
//!
//! Reads `session` joined with `"user"`; expired sessions are filtered in
//! SQL. Nothing is written.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use dash_core::{Role, Session, SessionUser};
use sqlx::PgPool;

use crate::auth::{extract_token, SessionLookup, SessionLookupError};

/// [`SessionLookup`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgSessionLookup {
    pool: PgPool,
    cookie_name: String,
}

impl PgSessionLookup {
    pub fn new(pool: PgPool, cookie_name: impl Into<String>) -> Self {
        Self {
            pool,
            cookie_name: cookie_name.into(),
        }
    }
}

#[axum::async_trait]
impl SessionLookup for PgSessionLookup {
    async fn get_session(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<Session>, SessionLookupError> {
        let Some(token) = extract_token(headers, &self.cookie_name) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, SessionRow>(
            r#"SELECT s.expires_at, u.id AS user_id, u.name, u.email, u.role
               FROM session s
               JOIN "user" u ON u.id = s.user_id
               WHERE s.token = $1 AND s.expires_at > now()"#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct SessionRow {
    expires_at: DateTime<Utc>,
    user_id: String,
    name: String,
    email: String,
    role: Option<String>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        let role = self
            .role
            .as_deref()
            .map(Role::from_label)
            .unwrap_or(Role::User);
        Session {
            user: SessionUser {
                id: self.user_id,
                name: self.name,
                email: self.email,
                role,
            },
            expires_at: self.expires_at,
        }
    }
}
