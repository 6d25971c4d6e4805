//! Client poller: relay first, direct calendar fetch as fallback.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dayboard_core::Event;
use dayboard_providers::{CalendarSource, FetchError, PermissionReason};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::relay_client::RelayClient;
use crate::session::SessionToken;

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Relay,
    Direct,
}

/// Events as of one poll.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub events: Vec<Event>,
    /// When the relay last refreshed. Direct fetches are stamped with the
    /// time of the fetch.
    pub last_fetch: Option<DateTime<Utc>>,
    pub source: SnapshotSource,
}

/// Why a poll produced nothing, phrased for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    ApiNotEnabled,
    PermissionDenied,
    AuthenticationFailed,
    Other(String),
}

impl PollFailure {
    /// Maps a direct-fetch error to what the user is told.
    pub fn from_fetch(error: &FetchError) -> Self {
        match error {
            FetchError::TokenExpired => Self::AuthenticationFailed,
            FetchError::PermissionDenied {
                reason: PermissionReason::ApiNotEnabled,
                ..
            } => Self::ApiNotEnabled,
            FetchError::PermissionDenied { .. } => Self::PermissionDenied,
            FetchError::Upstream { message, .. } => Self::Other(message.clone()),
        }
    }
}

impl fmt::Display for PollFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiNotEnabled => f.write_str(
                "Google Calendar API is not enabled. Please enable it in Google Cloud Console.",
            ),
            Self::PermissionDenied => f.write_str(
                "Calendar access denied. Please ensure Google Calendar API is enabled and you granted calendar permissions.",
            ),
            Self::AuthenticationFailed => {
                f.write_str("Authentication failed. Please sign out and sign in again.")
            }
            Self::Other(message) => f.write_str(message),
        }
    }
}

pub type PollResult = Result<Snapshot, PollFailure>;

/// Reads today's events for one client.
pub struct ClientPoller {
    relay: RelayClient,
    session: SessionToken,
    fallback: Option<Arc<dyn CalendarSource>>,
    interval: Duration,
}

impl ClientPoller {
    pub fn new(relay: RelayClient, session: SessionToken, interval: Duration) -> Self {
        Self {
            relay,
            session,
            fallback: None,
            interval,
        }
    }

    /// Enables the direct fetch used when the relay cannot be read.
    pub fn with_fallback(mut self, source: Arc<dyn CalendarSource>) -> Self {
        self.fallback = Some(source);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One poll: the relay's cache, or a direct fetch if the relay fails
    /// and a session token is held.
    pub async fn poll_once(&self) -> PollResult {
        let relay_error = match self.relay.events().await {
            Ok(response) => {
                debug!(count = response.events.len(), "events read from relay");
                return Ok(Snapshot {
                    events: response.events,
                    last_fetch: response.last_fetch,
                    source: SnapshotSource::Relay,
                });
            }
            Err(e) => e,
        };
        warn!(error = %relay_error, "relay read failed");

        let Some(source) = self.fallback.as_ref() else {
            return Err(PollFailure::Other(relay_error.to_string()));
        };
        let token = match self.session.get() {
            Ok(Some(token)) => token,
            Ok(None) => return Err(PollFailure::Other(relay_error.to_string())),
            Err(e) => {
                warn!(error = %e, "failed to read session token");
                return Err(PollFailure::Other(relay_error.to_string()));
            }
        };

        info!(source = source.name(), "falling back to direct calendar fetch");
        match source.fetch(&token).await {
            Ok(events) => Ok(Snapshot {
                events,
                last_fetch: Some(Utc::now()),
                source: SnapshotSource::Direct,
            }),
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "direct calendar fetch failed");
                if e.invalidates_token()
                    && let Err(clear_err) = self.session.clear()
                {
                    warn!(error = %clear_err, "failed to remove session token");
                }
                Err(PollFailure::from_fetch(&e))
            }
        }
    }

    /// Polls now and then every interval, handing each result to
    /// `on_result`, until the returned handle is stopped.
    pub fn spawn<F>(self, mut on_result: F) -> PollerHandle
    where
        F: FnMut(PollResult) + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = async { let _ = stop_rx.wait_for(|stop| *stop).await; } => break,
                    _ = ticker.tick() => on_result(self.poll_once().await),
                }
            }
            debug!("poller stopped");
        });
        PollerHandle { stop_tx, task }
    }
}

/// Stops a spawned poller.
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Clears the interval and waits for an in-flight poll to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "poller task failed");
        }
    }
}
