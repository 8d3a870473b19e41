//! Database migration command.

use khaja_server::db::MIGRATOR;

/// Run all pending migrations.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;
    tracing::info!("Migrations complete");

    Ok(())
}
