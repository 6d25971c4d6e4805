//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/dayboard/config.toml` by default. Every section and key is
//! optional.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dayboard_providers::DEFAULT_API_BASE;
use dayboard_server::{DEFAULT_PORT, ServerConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the dayboard client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug logging, same as `--debug`.
    pub debug: bool,

    /// Where the relay lives.
    pub relay: RelaySettings,

    /// Client poller behaviour.
    pub poller: PollerSettings,

    /// Local files.
    pub storage: StorageSettings,

    /// Defaults for `dayboard serve`.
    pub server: ServerSettings,
}

/// Relay connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Base URL of the relay.
    pub url: String,

    /// Timeout for each relay call, in seconds.
    pub timeout: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            url: format!("http://127.0.0.1:{DEFAULT_PORT}"),
            timeout: 5,
        }
    }
}

/// Client poller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    /// Seconds between relay reads in `dayboard watch`.
    pub interval: u64,

    /// Call the calendar API directly when the relay is unreachable.
    pub fallback: bool,

    /// Calendar API base URL for the direct fallback.
    pub api_base_url: String,

    /// Timeout for the direct fallback, in seconds.
    pub upstream_timeout: u64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: 60,
            fallback: true,
            api_base_url: DEFAULT_API_BASE.to_string(),
            upstream_timeout: 15,
        }
    }
}

/// Local storage locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for the checklist and quick-access documents.
    pub data_dir: Option<PathBuf>,

    /// File holding the client-side session token.
    pub session_file: Option<PathBuf>,
}

/// Defaults for the embedded relay (`dayboard serve`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address.
    pub bind: Option<SocketAddr>,

    /// Directory for `token.json` and `events.json`.
    pub data_dir: Option<PathBuf>,

    /// Built UI bundle to serve.
    pub static_dir: Option<PathBuf>,

    /// Seconds between scheduled refreshes.
    pub refresh_interval: Option<u64>,

    /// Timeout for each upstream call, in seconds.
    pub upstream_timeout: Option<u64>,

    /// Calendar API base URL.
    pub api_base_url: Option<String>,
}

impl ServerSettings {
    /// Builds a server configuration, leaving unset keys at their defaults.
    pub fn to_server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::default();
        if let Some(bind) = self.bind {
            config = config.with_bind(bind);
        }
        if let Some(ref dir) = self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(ref dir) = self.static_dir {
            config = config.with_static_dir(dir);
        }
        if let Some(secs) = self.refresh_interval {
            config = config.with_refresh_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = self.upstream_timeout {
            config = config.with_upstream_timeout(Duration::from_secs(secs));
        }
        if let Some(ref url) = self.api_base_url {
            config = config.with_api_base_url(url);
        }
        config
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads and validates configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("failed to read config: {}", e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dayboard")
    }

    /// Directory for the local collections.
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("dayboard")
                .join("board")
        })
    }

    /// File holding the session token.
    pub fn session_file(&self) -> PathBuf {
        self.storage
            .session_file
            .clone()
            .unwrap_or_else(crate::session::default_session_path)
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay.timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poller.interval)
    }

    /// Checks the values a command would trip over.
    pub fn validate(&self) -> ClientResult<()> {
        if !is_http_url(&self.relay.url) {
            return Err(ClientError::Config(format!(
                "relay.url must be an http(s) URL: {}",
                self.relay.url
            )));
        }
        if self.relay.timeout == 0 {
            return Err(ClientError::Config("relay.timeout must be greater than zero".into()));
        }
        if self.poller.interval == 0 {
            return Err(ClientError::Config("poller.interval must be greater than zero".into()));
        }
        if self.poller.upstream_timeout == 0 {
            return Err(ClientError::Config(
                "poller.upstream_timeout must be greater than zero".into(),
            ));
        }
        if !is_http_url(&self.poller.api_base_url) {
            return Err(ClientError::Config(format!(
                "poller.api_base_url must be an http(s) URL: {}",
                self.poller.api_base_url
            )));
        }
        self.server
            .to_server_config()
            .validate()
            .map_err(|e| ClientError::Config(format!("[server] {}", e)))
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
