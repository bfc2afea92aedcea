//! # User Procedures

use dash_core::{AuthedContext, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// The signed-in user, as returned by `user.me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    /// `user` or `admin`.
    pub role: String,
}

impl UserProfile {
    pub fn from_session(session: &dash_core::Session) -> Self {
        Self {
            id: session.user.id.clone(),
            name: session.user.name.clone(),
            email: session.user.email.clone(),
            role: session.role().as_str().to_string(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}

/// `user.me`
pub async fn me(ctx: AuthedContext<AppState>) -> anyhow::Result<UserProfile> {
    Ok(UserProfile::from_session(&ctx.session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dash_core::Session;

    #[tokio::test]
    async fn me_reflects_session() {
        let ctx = AuthedContext {
            session: Session::new("alice", Role::Admin, Utc::now() + Duration::hours(1)),
            db: AppState::new(),
        };
        let profile = me(ctx).await.unwrap();
        assert_eq!(profile.id, "alice");
        assert_eq!(profile.role, "admin");
        assert!(profile.is_admin());
    }
}
