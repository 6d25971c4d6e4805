//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use dayboard_providers::DEFAULT_API_BASE;

use crate::error::{ServerError, ServerResult};

/// Port the relay listens on by default.
pub const DEFAULT_PORT: u16 = 1122;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to. Loopback only by default.
    pub bind: SocketAddr,

    /// Directory holding `token.json` and `events.json`.
    pub data_dir: PathBuf,

    /// Built UI bundle to serve, if any.
    pub static_dir: Option<PathBuf>,

    /// Time between scheduled refreshes.
    pub refresh_interval: Duration,

    /// Upper bound on each upstream calendar call.
    pub upstream_timeout: Duration,

    /// Calendar API base URL (overridable for tests and proxies).
    pub api_base_url: String,

    /// Refresh once at startup when a token is already stored.
    pub refresh_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            data_dir: default_data_dir(),
            static_dir: None,
            refresh_interval: Duration::from_secs(60 * 60),
            upstream_timeout: Duration::from_secs(15),
            api_base_url: DEFAULT_API_BASE.to_string(),
            refresh_on_start: true,
        }
    }
}

impl ServerConfig {
    /// Creates a configuration storing its state in `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Builder: set bind address.
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Builder: serve a static UI bundle.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Builder: set refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Builder: set upstream timeout.
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Builder: set the calendar API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: toggle the startup refresh.
    pub fn with_refresh_on_start(mut self, enabled: bool) -> Self {
        self.refresh_on_start = enabled;
        self
    }

    /// Rejects values the relay cannot run with.
    pub fn validate(&self) -> ServerResult<()> {
        if self.refresh_interval.is_zero() {
            return Err(ServerError::config("refresh interval must be greater than zero"));
        }
        if self.upstream_timeout.is_zero() {
            return Err(ServerError::config("upstream timeout must be greater than zero"));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(ServerError::config(format!(
                "calendar API base URL must be http(s): {}",
                self.api_base_url
            )));
        }
        Ok(())
    }
}

/// Returns the default data directory.
///
/// Uses `$XDG_DATA_HOME/dayboard` (or the platform equivalent) if available,
/// otherwise `./data`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("dayboard"))
        .unwrap_or_else(|| PathBuf::from("data"))
}
