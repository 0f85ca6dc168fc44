//! Catalog schema migrations.

use sqlx::PgPool;
use tracing::info;

use mycloud_core::error::{AppError, ErrorKind};

/// Apply the pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Applying catalog migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Catalog schema is up to date");
    Ok(())
}
