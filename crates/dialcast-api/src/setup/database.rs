//! Database setup and initialization
//!
//! The pool is created first, then the workspace `migrations/` directory is applied.

use anyhow::{Context, Result};
use dialcast_core::Config;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Connect, retrying while Postgres is still starting, then migrate.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = connect_with_retry(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn connect_with_retry(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800));

    let mut attempt = 1;
    loop {
        match options.clone().connect(config.database_url()).await {
            Ok(pool) => {
                tracing::info!(
                    max_connections = config.db_max_connections(),
                    attempt,
                    "Database connected"
                );
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(error = %e, attempt, "Database not reachable yet, retrying");
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => return Err(e).context("Failed to connect to database"),
        }
    }
}

async fn run_migrations(pool: &PgPool) -> Result<()> {
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;

    migrator
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!(
        migrations = migrator.iter().count(),
        "Database schema up to date"
    );
    Ok(())
}
