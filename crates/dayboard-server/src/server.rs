//! Wiring: stores, refresher, scheduler and HTTP listener.

use std::fs;
use std::sync::Arc;

use dayboard_providers::{CalendarSource, GoogleCalendarSource};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cache::EventCache;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::refresh::Refresher;
use crate::relay::router;
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::signals::{ShutdownSignal, SignalHandler};
use crate::tokens::TokenStore;

/// A relay ready to run.
#[derive(Debug)]
pub struct Relay {
    config: ServerConfig,
    refresher: Arc<Refresher>,
}

impl Relay {
    /// Opens the stores in `config.data_dir` and binds them to `source`.
    pub fn open(config: ServerConfig, source: Arc<dyn CalendarSource>) -> ServerResult<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let tokens = Arc::new(TokenStore::open(&config.data_dir));
        let cache = Arc::new(EventCache::open(&config.data_dir));
        info!(
            data_dir = %config.data_dir.display(),
            has_token = tokens.has_token(),
            cached_events = cache.len(),
            "relay state loaded"
        );

        Ok(Self {
            refresher: Arc::new(Refresher::new(tokens, cache, source)),
            config,
        })
    }

    pub fn refresher(&self) -> Arc<Refresher> {
        self.refresher.clone()
    }

    /// Serves on `listener` until `shutdown` fires, with the refresh timer
    /// running alongside. The timer is stopped before this returns.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> ServerResult<()> {
        let scheduler = Scheduler::new(
            SchedulerConfig::new(self.config.refresh_interval)
                .with_refresh_on_start(self.config.refresh_on_start),
            self.refresher.clone(),
        );
        let timer = tokio::spawn(scheduler.run(shutdown.clone()));

        let app = router(self.refresher.clone(), self.config.static_dir.as_deref());
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "dayboard relay listening");
        }

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .await;

        if let Err(e) = timer.await {
            warn!(error = %e, "refresh timer task failed");
        }
        info!("relay stopped");
        served.map_err(ServerError::from)
    }
}

/// Runs the relay against Google Calendar until SIGTERM/SIGINT.
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let source = GoogleCalendarSource::with_base_url(&config.api_base_url, config.upstream_timeout)
        .map_err(|e| ServerError::config(e.to_string()))?;
    let bind = config.bind;
    let relay = Relay::open(config, Arc::new(source))?;

    let listener = TcpListener::bind(bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind.to_string(),
            source,
        })?;

    let signals = SignalHandler::new();
    signals.spawn_listener();
    relay.run(listener, signals.shutdown()).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dayboard_protocol::{EVENTS_PATH, EventsResponse, RelayResponse, TOKEN_PATH};

    use super::*;
    use crate::testing::{ScriptedSource, event};

    #[tokio::test]
    async fn end_to_end_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(ScriptedSource::ok(vec![event("a1", "Team Sync", 9)]));
        let relay = Relay::open(ServerConfig::new(dir.path()), source.clone()).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let signals = SignalHandler::new();
        let task = tokio::spawn(relay.run(listener, signals.shutdown()));

        let http = reqwest::Client::new();
        let submitted: RelayResponse = http
            .post(format!("{base}{TOKEN_PATH}"))
            .json(&serde_json::json!({"token": "tok-123"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(submitted.success);

        let events: EventsResponse = http
            .get(format!("{base}{EVENTS_PATH}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(events.events.len(), 1);
        assert_eq!(events.events[0].summary, "Team Sync");
        assert!(events.last_fetch.is_some());

        signals.trigger_shutdown();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        // State survives a restart.
        let reopened = Relay::open(ServerConfig::new(dir.path()), source).unwrap();
        assert!(reopened.refresher().has_token());
        assert_eq!(reopened.refresher().cache().len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::new(dir.path()).with_refresh_interval(Duration::ZERO);
        let err = Relay::open(config, Arc::new(ScriptedSource::ok(Vec::new()))).unwrap_err();
        assert!(matches!(err, ServerError::Config { .. }));
    }
}
