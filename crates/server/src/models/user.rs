//! User account models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use khaja_core::{Role, UserId};

/// A registered account. Phone doubles as the login handle.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// The subset of a user exposed after login and used for contact-snapshot
/// resolution during order placement.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    pub role: Role,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            phone: user.phone,
            role: user.role,
        }
    }
}
