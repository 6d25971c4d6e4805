//! Relay: token store, event cache, refresh scheduler, HTTP endpoints.
//!
//! A browser or CLI hands the relay a short-lived calendar token; the relay
//! refreshes today's events with it every hour and serves the cached copy
//! to any number of pollers:
//!
//! - [`TokenStore`] / [`EventCache`] - single-slot documents in the data dir
//! - [`Refresher`] - one serialized refresh attempt at a time
//! - [`Scheduler`] - startup attempt plus the hourly timer
//! - [`router`] - `/api/calendar/*` endpoints and optional static UI
//!
//! # Example
//!
//! ```rust,no_run
//! use dayboard_server::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     serve(ServerConfig::default()).await?;
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod error;
mod persist;
mod refresh;
mod relay;
mod scheduler;
mod server;
mod signals;
mod tokens;

pub use cache::{CacheRecord, EVENTS_FILE, EventCache};
pub use config::{DEFAULT_PORT, ServerConfig, default_data_dir};
pub use error::{ServerError, ServerResult, StoreError, StoreResult};
pub use refresh::{RefreshOutcome, RefreshState, RefreshTrigger, Refresher};
pub use relay::{RelayState, router};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use server::{Relay, serve};
pub use signals::{ShutdownSignal, SignalHandler};
pub use tokens::{TOKEN_FILE, TokenRecord, TokenStore};
