//! CLI command implementations.

pub mod draws;
pub mod init;
pub mod run;
pub mod status;
pub mod tickets;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator};
use crate::domain::models::Config;
use crate::infrastructure::ConfigLoader;

/// Load config and open the project database, applying pending migrations.
pub(crate) async fn open_database() -> Result<(Config, SqlitePool)> {
    let config = ConfigLoader::load()?;
    let pool = create_pool(&config.database.path, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("Failed to apply database migrations")?;
    Ok((config, pool))
}
