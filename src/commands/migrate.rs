//! Database migration command.

use mycloud_core::config::AppConfig;
use mycloud_core::error::AppError;
use mycloud_database::DatabasePool;
use mycloud_database::migration::run_migrations;

use crate::output;

/// Apply all pending catalog migrations.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;
    pool.close().await;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
