mod analytics;
mod common;
mod config;
mod experiments;
mod harvests;
mod routes;

#[cfg(test)]
mod test_helpers;

use crate::config::Config;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config: Config = Config::from_env()?;

    // SQLite creates the file but not its parent directory
    if let Some(parent) = config
        .sqlite_path()
        .as_deref()
        .and_then(std::path::Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }

    let db: DatabaseConnection = Database::connect(config.db_url.as_str()).await?;
    info!(db_url = %config.db_url, "connected to the database");

    Migrator::up(&db, None).await?;
    info!("database migrations complete");

    info!(
        app = %config.app_name,
        deployment = %config.deployment,
        harvest_policy = %config.harvest_policy,
        "starting server"
    );

    // Single-user tool: only listen on the loopback interface
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    let router = routes::build_router(&db, &config);
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
