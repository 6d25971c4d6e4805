//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dayboard_core::tracing::{TracingConfig, TracingOutputFormat};
use tracing::Level;

use crate::config::ClientConfig;

/// dayboard - Your day at a glance
#[derive(Debug, Parser)]
#[command(name = "dayboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "DAYBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Relay base URL (overrides `[relay] url`)
    #[arg(long, env = "DAYBOARD_RELAY")]
    pub relay: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Logging profile for this invocation. `debug = true` in the config
    /// file has the same effect as `--debug`.
    pub fn tracing_config(&self, config: &ClientConfig) -> TracingConfig {
        let debug = self.debug || config.debug;
        match self.command {
            Some(Command::Serve(ref args)) if args.log_json => {
                TracingConfig::server().with_format(TracingOutputFormat::Json)
            }
            Some(Command::Serve(_)) if debug => TracingConfig::server().with_level(Level::DEBUG),
            Some(Command::Serve(_)) => TracingConfig::server(),
            _ => TracingConfig::cli(debug),
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the relay in the foreground
    Serve(ServeArgs),

    /// Keep a calendar token for this session and hand it to the relay
    Login {
        /// OAuth access token with calendar read scope
        #[arg(env = "DAYBOARD_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Forget the session token
    Logout,

    /// Show today's events
    Events,

    /// Ask the relay to refresh now
    Refresh,

    /// Show the relay's refresh status
    Status,

    /// Show today's events and keep them updated
    Watch {
        /// Seconds between polls (overrides `[poller] interval`)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Today's tasks
    Tasks {
        #[command(subcommand)]
        action: ChecklistAction,
    },

    /// Weekly goals
    Weekly {
        #[command(subcommand)]
        action: ChecklistAction,
    },

    /// Monthly goals
    Monthly {
        #[command(subcommand)]
        action: ChecklistAction,
    },

    /// Quick-access links
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags of `dayboard serve`. Unset flags fall back to `[server]` in the
/// config file, then to built-in defaults.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, env = "DAYBOARD_BIND")]
    pub bind: Option<SocketAddr>,

    /// Directory for token.json and events.json
    #[arg(long, env = "DAYBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Built UI bundle to serve with index.html fallback
    #[arg(long, env = "DAYBOARD_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Seconds between scheduled refreshes
    #[arg(long)]
    pub refresh_interval: Option<u64>,

    /// Calendar API base URL
    #[arg(long, env = "DAYBOARD_API_BASE")]
    pub api_base_url: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Checklist actions.
#[derive(Debug, Subcommand)]
pub enum ChecklistAction {
    /// List items, newest first
    List,

    /// Add an item
    Add {
        /// Item text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Toggle completion
    Toggle {
        /// Item id or unique id prefix
        id: String,
    },

    /// Delete an item
    Delete {
        /// Item id or unique id prefix
        id: String,
    },
}

/// Quick-access actions.
#[derive(Debug, Subcommand)]
pub enum LinkAction {
    /// List links, newest first
    List,

    /// Add a link
    Add {
        /// Tile label
        name: String,

        /// Address; `https://` is added when no scheme is given
        url: String,
    },

    /// Delete a link
    Delete {
        /// Link id or unique id prefix
        id: String,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
