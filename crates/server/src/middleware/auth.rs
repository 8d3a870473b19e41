//! Admin access guard.
//!
//! Admin endpoints identify the caller through the `x-user-id` header and
//! check the stored role. A missing or malformed header is 401; a known
//! user without the admin role, or an unknown id, is 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use khaja_core::{Role, UserId};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that rejects the request unless the caller is an admin.
///
/// Carries the verified admin's id.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub UserId);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .map(UserId::new)
            .ok_or(AppError::Unauthorized)?;

        let role = UserRepository::new(state.pool())
            .get_role(user_id)
            .await
            .map_err(AppError::from)?;

        match role {
            Some(Role::Admin) => Ok(Self(user_id)),
            Some(_) | None => Err(AppError::Forbidden),
        }
    }
}
