//! Caller identity.
//!
//! Authentication happens upstream. The gateway forwards the authenticated
//! user id in `X-User-Id`; this extractor resolves it to a user and role.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "This action requires the {role} role"
            )))
        }
    }
}

/// Parses the forwarded user id header value.
pub fn parse_user_id(raw: Option<&str>) -> Result<i64, AppError> {
    raw.map(str::trim)
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or(AppError::Unauthorized)
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        let user_id = parse_user_id(raw)?;

        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?;
        let user = user.ok_or(AppError::Unauthorized)?;

        let role = user.role.parse::<Role>().map_err(|e| {
            warn!("User {user_id} has unusable role: {e}");
            AppError::Forbidden("Unknown user role".to_string())
        })?;

        Ok(Actor {
            user_id: user.id,
            username: user.username,
            role,
        })
    }
}
