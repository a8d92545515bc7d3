//! Migrate command - applies the PostgreSQL schema

use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::storage::{
    connect_pool, migrations::PostgresMigrator, run_migrations, PostgresConfig,
};

/// Apply all pending migrations to `storage.database_url`
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let url = database_url(&config)?;

    let pool = connect_pool(&PostgresConfig::new(url)).await?;
    let applied = run_migrations(&pool).await?;
    let version = PostgresMigrator::new(pool.clone()).current_version().await?;

    info!(applied, version = ?version, "Database migrations complete");
    pool.close().await;
    Ok(())
}

fn database_url(config: &AppConfig) -> anyhow::Result<&str> {
    config
        .storage
        .database_url
        .as_deref()
        .context("storage.database_url (or DATABASE_URL) must be set to run migrations")
}
