use crate::harvests::models::HarvestPolicy;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

pub const DEFAULT_DB_URL: &str = "sqlite://data/myco_logger.db?mode=rwc";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub app_name: String,
    pub deployment: String,
    pub port: u16,
    pub harvest_policy: HarvestPolicy,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first when present.
    ///
    /// Every variable has a default so the logger runs with no setup at all.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load from .env file if available

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {e}"))?,
            Err(_) => 3000,
        };

        let harvest_policy = match env::var("HARVEST_POLICY") {
            Ok(raw) => raw.parse().map_err(|e| {
                anyhow::anyhow!(
                    "HARVEST_POLICY {e}, expected allow_all, forbid_contaminated or forbid_terminal"
                )
            })?,
            Err(_) => HarvestPolicy::default(),
        };

        Ok(Config {
            db_url: env::var("DB_URL").unwrap_or_else(|_| DEFAULT_DB_URL.to_string()),
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "myco-logger".to_string()),
            deployment: env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            port,
            harvest_policy,
        })
    }

    /// Filesystem path of the SQLite file behind `db_url`, if it names one.
    pub fn sqlite_path(&self) -> Option<std::path::PathBuf> {
        let rest = self.db_url.strip_prefix("sqlite://")?;
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path.starts_with(":memory:") {
            return None;
        }
        Some(std::path::PathBuf::from(path))
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            db_url: "sqlite::memory:".to_string(),
            app_name: "myco-logger-test".to_string(),
            deployment: "test".to_string(),
            port: 0,
            harvest_policy: HarvestPolicy::default(),
        }
    }
}
