//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDateTime, Utc};

use crate::cache::CacheConfig;
use crate::collector::{CollectorConfig, DEFAULT_BASE_URL};
use crate::window::{DEFAULT_WINDOW_MINS, NearTermWindow};

/// Indian Standard Time, UTC+05:30.
const IST_OFFSET_MINS: i32 = 330;

/// A configuration variable held a value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Configuration for the gate status server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,

    /// Station catalog JSON file.
    pub catalog_path: PathBuf,

    /// Base URL of the live-station site.
    pub ntes_base_url: String,

    /// Serve junction boards from `{CODE}.json` files in this directory
    /// instead of the live site.
    pub mock_boards_dir: Option<PathBuf>,

    /// Near-term look-ahead (minutes).
    pub time_window_mins: i64,

    /// Form submissions per junction before giving up.
    pub fetch_attempts: u32,

    /// Pause between attempts (seconds).
    pub retry_backoff_secs: u64,

    /// Per-page timeout (seconds).
    pub page_timeout_secs: u64,

    /// Junctions fetched at once within a session. 1 is sequential.
    pub fetch_concurrency: usize,

    /// How long a fetched junction board is reused (seconds).
    pub cache_ttl_secs: u64,

    /// Offset of the railway's local time from UTC (minutes).
    pub utc_offset_mins: i32,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`; unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = parsed(&lookup, "GATE_SERVER_ADDR")? {
            config.addr = addr;
        }
        if let Some(path) = lookup("STATION_CATALOG_PATH") {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("NTES_BASE_URL") {
            config.ntes_base_url = url;
        }
        if let Some(dir) = lookup("MOCK_BOARDS_DIR").filter(|d| !d.is_empty()) {
            config.mock_boards_dir = Some(PathBuf::from(dir));
        }
        if let Some(n) = parsed(&lookup, "GATE_FETCH_CONCURRENCY")? {
            config.fetch_concurrency = n;
        }
        if let Some(mins) = parsed(&lookup, "GATE_UTC_OFFSET_MINS")? {
            config.utc_offset_mins = mins;
        }

        if config.fetch_concurrency == 0 {
            return Err(ConfigError {
                var: "GATE_FETCH_CONCURRENCY",
                value: "0".into(),
            });
        }
        if config.utc_offset().is_none() {
            return Err(ConfigError {
                var: "GATE_UTC_OFFSET_MINS",
                value: config.utc_offset_mins.to_string(),
            });
        }

        Ok(config)
    }

    /// Returns the near-term window.
    pub fn window(&self) -> NearTermWindow {
        NearTermWindow::new(self.time_window_mins)
    }

    /// Returns the live-site collector configuration.
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig::new()
            .with_base_url(&self.ntes_base_url)
            .with_attempts(self.fetch_attempts)
            .with_backoff(Duration::from_secs(self.retry_backoff_secs))
            .with_page_timeout(Duration::from_secs(self.page_timeout_secs))
            .with_window(self.window())
    }

    /// Returns the junction board cache configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            ..CacheConfig::default()
        }
    }

    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_mins * 60)
    }

    /// Current local railway time.
    pub fn now(&self) -> NaiveDateTime {
        let utc = Utc::now();
        match self.utc_offset() {
            Some(offset) => utc.with_timezone(&offset).naive_local(),
            None => utc.naive_utc(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            catalog_path: PathBuf::from("data/kerala_railway_stations.json"),
            ntes_base_url: DEFAULT_BASE_URL.to_string(),
            mock_boards_dir: None,
            time_window_mins: DEFAULT_WINDOW_MINS,
            fetch_attempts: 2,
            retry_backoff_secs: 2,
            page_timeout_secs: 20,
            fetch_concurrency: 1,
            cache_ttl_secs: 60,
            utc_offset_mins: IST_OFFSET_MINS,
        }
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError { var, value }),
    }
}
