//! Host configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::arrivals::LiveConfig;
use crate::cache::LineCacheConfig;
use crate::remote::{BusApi, BusApiClient, BusApiConfig, MockBusApi, RemoteError};
use crate::schedule::ScheduleConfig;

/// Default path for the persisted line cache.
const DEFAULT_CACHE_PATH: &str = "lines_cache.json";

/// Default listen address.
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Errors from reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BUS_LISTEN_ADDR {value:?}: {source}")]
    InvalidListenAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Everything the host needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key for the bus API (`BUS_API_KEY`).
    pub api_key: Option<String>,

    /// Override for the API base URL (`BUS_API_URL`).
    pub api_url: Option<String>,

    /// Serve from this mock data directory instead of the API
    /// (`BUS_MOCK_DATA`).
    pub mock_data: Option<PathBuf>,

    /// Where the line cache is persisted (`BUS_CACHE_PATH`).
    pub cache_path: PathBuf,

    /// Address to listen on (`BUS_LISTEN_ADDR`).
    pub listen_addr: SocketAddr,

    pub line_cache: LineCacheConfig,
    pub live: LiveConfig,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen = var("BUS_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidListenAddr {
                value: listen.clone(),
                source,
            })?;

        Ok(Self {
            api_key: var("BUS_API_KEY"),
            api_url: var("BUS_API_URL"),
            mock_data: var("BUS_MOCK_DATA").map(PathBuf::from),
            cache_path: var("BUS_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
            listen_addr,
            line_cache: LineCacheConfig::default(),
            live: LiveConfig::default(),
            schedule: ScheduleConfig::default(),
        })
    }

    /// Build the remote source: the mock when a data directory is set,
    /// otherwise the HTTP API.
    pub fn remote(&self) -> Result<BusApi, RemoteError> {
        if let Some(dir) = &self.mock_data {
            info!(dir = %dir.display(), "Using mock bus API");
            return Ok(BusApi::Mock(MockBusApi::new(dir)?));
        }

        let api_key = self.api_key.clone().unwrap_or_else(|| {
            warn!("BUS_API_KEY not set, API calls will fail");
            String::new()
        });

        let mut config = BusApiConfig::new(api_key);
        if let Some(url) = &self.api_url {
            config = config.with_base_url(url);
        }

        Ok(BusApi::Http(BusApiClient::new(config)?))
    }
}
