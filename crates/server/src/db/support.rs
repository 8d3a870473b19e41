//! Support message repository.
//!
//! Stores messages submitted through the support/chat widget. The canned
//! response logic lives client-side; the server only persists the message.

use chrono::Utc;
use sqlx::SqlitePool;

use khaja_core::{SupportMessageId, UserId};

use super::RepositoryError;

/// Repository for support messages.
pub struct SupportRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SupportRepository<'a> {
    /// Create a new support repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one support message and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: Option<UserId>,
        name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        body: Option<&str>,
    ) -> Result<SupportMessageId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO support_messages (user_id, name, phone, email, body, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(user_id.map(|id| id.as_i64()))
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(body)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        Ok(SupportMessageId::new(result.last_insert_rowid()))
    }
}
