//! Process configuration.
//!
//! Built once at startup (defaults, then environment, then command-line
//! overrides) and handed to each component. Nothing reads global state
//! after that.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::citybikes::{CityBikesConfig, DEFAULT_API_URL};
use crate::domain::DEFAULT_RANKING_LIMIT;
use crate::scheduler::DEFAULT_POLL_INTERVAL;

pub const ENV_API_URL: &str = "BIKE_MONITOR_API_URL";
pub const ENV_DB_PATH: &str = "BIKE_MONITOR_DB_PATH";
pub const ENV_POLL_INTERVAL_SECS: &str = "BIKE_MONITOR_POLL_INTERVAL_SECS";
pub const ENV_RANKING_LIMIT: &str = "BIKE_MONITOR_RANKING_LIMIT";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "BIKE_MONITOR_HTTP_TIMEOUT_SECS";
pub const ENV_BIND: &str = "BIKE_MONITOR_BIND";

const DEFAULT_DB_PATH: &str = "bordeaux_bikes.db";
const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: &'static str,
}

/// Everything the pipeline needs to know about its environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// CityBikes network endpoint
    pub api_url: String,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Pause between cycles in continuous mode
    pub poll_interval: Duration,

    /// Number of stations in the logged ranking
    pub ranking_limit: usize,

    /// Optional HTTP request timeout (transport default when unset)
    pub request_timeout: Option<Duration>,

    /// Listen address for the HTTP API
    pub bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
            ranking_limit: DEFAULT_RANKING_LIMIT,
            request_timeout: None,
            bind_addr: SocketAddr::from(DEFAULT_BIND),
        }
    }
}

impl Config {
    /// Defaults overridden by `BIKE_MONITOR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(path) = lookup(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup(ENV_POLL_INTERVAL_SECS) {
            config.poll_interval = Duration::from_secs(parse_positive(ENV_POLL_INTERVAL_SECS, &secs)?);
        }
        if let Some(limit) = lookup(ENV_RANKING_LIMIT) {
            config.ranking_limit = parse_positive(ENV_RANKING_LIMIT, &limit)? as usize;
        }
        if let Some(secs) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            config.request_timeout = Some(Duration::from_secs(parse_positive(ENV_HTTP_TIMEOUT_SECS, &secs)?));
        }
        if let Some(addr) = lookup(ENV_BIND) {
            config.bind_addr = addr.parse().map_err(|_| ConfigError {
                key: ENV_BIND,
                value: addr,
                reason: "expected HOST:PORT",
            })?;
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_ranking_limit(mut self, limit: usize) -> Self {
        self.ranking_limit = limit;
        self
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Client settings derived from this config.
    pub fn citybikes(&self) -> CityBikesConfig {
        let config = CityBikesConfig::new(&self.api_url);
        match self.request_timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "must be at least 1",
        }),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "expected a whole number",
        }),
    }
}
