//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use sqlx::PgPool;

use parti_poodles_site::config::{ConfigError, SiteConfig};
use parti_poodles_site::db;

/// Errors connecting to the site database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the database named by the site configuration.
pub async fn connect() -> Result<PgPool, ConnectError> {
    let config = SiteConfig::from_env()?;
    let url = config.require_database_url()?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(url).await?)
}
