//! Database operations for the Khaja `SQLite` store.
//!
//! # Tables
//!
//! - `users` - Accounts (phone is the login handle) and roles
//! - `categories` / `items` - The menu catalog
//! - `orders` / `order_items` - Checkout transactions and their line items
//! - `support_messages` - Messages from the support/chat widget
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/server/migrations/` and run once at
//! startup, before the listener binds. No request is served against an
//! unmigrated store.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub mod catalog;
pub mod orders;
pub mod support;
pub mod users;

pub use catalog::CatalogRepository;
pub use orders::{OrderFilter, OrderRepository};
pub use support::SupportRepository;
pub use users::UserRepository;

/// Embedded migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid (e.g. an unparsable
    /// decimal or status string).
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g. duplicate phone number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if it does not exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
) -> Result<SqlitePool, sqlx::Error> {
    let options = database_url
        .expose_secret()
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
