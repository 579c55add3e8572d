//! Server configuration from environment variables
//!
//! Read once at startup; there is no hot reload.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Station API credential; the poller stays disabled when empty
    pub api_key: String,

    /// Station identifier at the remote API
    pub station_id: String,

    /// sqlx connection string (default: local file-backed SQLite)
    pub database_url: String,

    /// Poll cadence in seconds (default: 600 = 10 minutes)
    pub poll_interval: u64,

    /// Observations older than this many days are eligible for pruning
    pub retention_days: i64,

    /// HTTP listen address
    pub http_bind: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("WEATHER_API_KEY").unwrap_or_default();

        let station_id =
            env::var("WEATHER_STATION_ID").unwrap_or_else(|_| "IRIODE146".to_string());

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:weather.db?mode=rwc".to_string());

        let poll_interval = env::var("POLL_INTERVAL")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .context("Invalid POLL_INTERVAL")?;

        let retention_days = env::var("RETENTION_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("Invalid RETENTION_DAYS")?;

        let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:5001".to_string());

        Ok(Self {
            api_key,
            station_id,
            database_url,
            poll_interval,
            retention_days,
            http_bind,
        })
    }

    /// Whether a station credential is configured
    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }
}
