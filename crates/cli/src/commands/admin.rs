//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! khaja-cli admin create -n "Admin Name" -p 9800000000 --password <password>
//! ```
//!
//! # Environment Variables
//!
//! - `KHAJA_DATABASE_URL` (or `DATABASE_URL`) - `SQLite` connection string

use thiserror::Error;

use khaja_core::{Phone, Role};
use khaja_server::db::{RepositoryError, UserRepository};
use khaja_server::services::auth::{self, MIN_PASSWORD_LENGTH};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Invalid phone number.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// Password below the minimum length.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// User already exists.
    #[error("A user already exists with phone: {0}")]
    UserExists(String),

    /// Password hashing error.
    #[error("Password hashing failed")]
    Hashing,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Create a new admin user and print its id.
pub async fn create_user(
    name: &str,
    phone: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed =
        Phone::parse(phone).map_err(|e| AdminError::InvalidPhone(e.to_string()))?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::PasswordTooShort.into());
    }

    let hash = auth::hash_password(password).map_err(|_| AdminError::Hashing)?;

    let pool = super::connect().await?;

    tracing::info!("Creating admin user: {} ({})", name, parsed.as_str());

    let id = UserRepository::new(&pool)
        .create(name, &parsed, &hash, Role::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(phone.to_owned()),
            other => AdminError::Database(other.to_string()),
        })?;

    tracing::info!("Admin user created with id {id}");

    Ok(())
}
