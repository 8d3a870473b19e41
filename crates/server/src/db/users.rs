//! User repository.
//!
//! Accounts are looked up by id (admin gate, contact snapshots) and by phone
//! (login). The password hash never leaves this module except through
//! [`UserRepository::get_with_password_hash`] for the auth service.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use khaja_core::{Phone, Role, UserId};

use super::RepositoryError;
use crate::models::user::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    phone: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            phone: row.phone,
            role,
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, phone, role, created_at FROM users WHERE id = ?1",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user's role by ID. Used by the admin access guard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn get_role(&self, id: UserId) -> Result<Option<Role>, RepositoryError> {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM users WHERE id = ?1")
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        role.map(|r| {
            r.parse().map_err(|e: String| {
                RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
            })
        })
        .transpose()
    }

    /// Get a user and their password hash by phone number.
    ///
    /// Returns `None` if no account exists for the phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        phone: &Phone,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UserWithHashRow {
            id: i64,
            name: String,
            phone: String,
            role: String,
            created_at: DateTime<Utc>,
            password_hash: String,
        }

        let row: Option<UserWithHashRow> = sqlx::query_as(
            "SELECT id, name, phone, role, created_at, password_hash \
             FROM users WHERE phone = ?1",
        )
        .bind(phone.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hash = row.password_hash;
        let user = User::try_from(UserRow {
            id: row.id,
            name: row.name,
            phone: row.phone,
            role: row.role,
            created_at: row.created_at,
        })?;

        Ok(Some((user, hash)))
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        phone: &Phone,
        password_hash: &str,
        role: Role,
    ) -> Result<UserId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (name, phone, password_hash, role, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(name)
        .bind(phone.as_str())
        .bind(password_hash)
        .bind(role.to_string())
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("phone already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(UserId::new(result.last_insert_rowid()))
    }
}
