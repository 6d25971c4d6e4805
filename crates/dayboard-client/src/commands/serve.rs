//! Serve command: runs the relay in the foreground until SIGTERM/SIGINT.

use std::time::Duration;

use dayboard_server::{ServerConfig, serve};
use tracing::info;

use crate::cli::ServeArgs;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Layers CLI flags over the `[server]` section.
pub fn server_config(config: &ClientConfig, args: &ServeArgs) -> ServerConfig {
    let mut server = config.server.to_server_config();
    if let Some(bind) = args.bind {
        server = server.with_bind(bind);
    }
    if let Some(ref dir) = args.data_dir {
        server.data_dir = dir.clone();
    }
    if let Some(ref dir) = args.static_dir {
        server = server.with_static_dir(dir);
    }
    if let Some(secs) = args.refresh_interval {
        server = server.with_refresh_interval(Duration::from_secs(secs));
    }
    if let Some(ref url) = args.api_base_url {
        server = server.with_api_base_url(url);
    }
    server
}

pub async fn run(config: &ClientConfig, args: &ServeArgs) -> ClientResult<()> {
    let server = server_config(config, args);
    info!(
        bind = %server.bind,
        data_dir = %server.data_dir.display(),
        refresh_interval_secs = server.refresh_interval.as_secs(),
        "starting relay"
    );
    serve(server).await?;
    Ok(())
}
