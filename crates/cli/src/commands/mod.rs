//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use khaja_server::config::AppConfig;
use sqlx::SqlitePool;

/// Connect to the configured database.
pub async fn connect() -> Result<SqlitePool, Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let pool = khaja_server::db::create_pool(&config.database_url).await?;
    Ok(pool)
}
