//! Refresh attempts: token store → calendar source → event cache.
//!
//! Every path that refreshes (startup, the hourly tick, token submission,
//! forced refresh) goes through [`Refresher::refresh`]. Attempts never run
//! concurrently. A caller that queued behind an attempt which started
//! *after* the caller arrived takes that attempt's outcome instead of
//! fetching again; otherwise it runs its own, so a token stored just before
//! the call is always the one used.
//!
//! The attempt itself runs on its own task and holds the gate until it
//! finishes, so a caller that goes away mid-fetch (a dropped HTTP request)
//! neither cancels the fetch nor lets a second attempt overlap it.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use dayboard_protocol::RefreshStatus;
use dayboard_providers::{CalendarSource, FetchError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::cache::EventCache;
use crate::tokens::TokenStore;

/// What asked for a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    Interval,
    TokenSubmitted,
    Forced,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Interval => "interval",
            Self::TokenSubmitted => "token_submitted",
            Self::Forced => "forced",
        }
    }
}

impl fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cache now holds `count` events fetched at `fetched_at`.
    Refreshed {
        count: usize,
        fetched_at: DateTime<Utc>,
    },
    /// No token is held; nothing was fetched.
    NoToken,
    /// Upstream refused or failed; the cache is unchanged.
    Failed(FetchError),
    /// The fetch succeeded but the cache could not be written.
    Unsaved(String),
    /// The attempt task panicked or was cancelled by runtime shutdown.
    Interrupted(String),
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Refreshed { .. })
    }

    /// Human-readable failure reason, `None` on success.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Refreshed { .. } => None,
            Self::NoToken => Some("no token available".to_string()),
            Self::Failed(e) => Some(e.to_string()),
            Self::Unsaved(e) | Self::Interrupted(e) => Some(e.clone()),
        }
    }
}

/// Bookkeeping across attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshState {
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl RefreshState {
    /// Records a successful attempt.
    pub fn record_success(&mut self) {
        let now = Utc::now();
        self.consecutive_failures = 0;
        self.last_attempt = Some(now);
        self.last_success = Some(now);
        self.last_error = None;
    }

    /// Records a failed attempt.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_attempt = Some(Utc::now());
        self.last_error = Some(error.into());
    }

    /// Records an attempt skipped for lack of a token. Not a failure.
    pub fn record_skipped(&mut self) {
        self.last_attempt = Some(Utc::now());
    }
}

/// Owns the stores and the source, and serializes attempts.
pub struct Refresher {
    tokens: Arc<TokenStore>,
    cache: Arc<EventCache>,
    source: Arc<dyn CalendarSource>,
    /// Sequence number and outcome of the last completed attempt.
    gate: Arc<Mutex<Option<(u64, RefreshOutcome)>>>,
    /// Number of attempts started so far.
    started: AtomicU64,
    in_flight: Arc<AtomicBool>,
    state: Arc<RwLock<RefreshState>>,
}

/// Everything one attempt touches, detached from the [`Refresher`] so the
/// attempt can outlive the caller that started it.
struct Attempt {
    tokens: Arc<TokenStore>,
    cache: Arc<EventCache>,
    source: Arc<dyn CalendarSource>,
    in_flight: Arc<AtomicBool>,
    state: Arc<RwLock<RefreshState>>,
}

/// Clears the `refreshing` flag however the fetch ends.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn enter(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl fmt::Debug for Refresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refresher")
            .field("source", &self.source.name())
            .field("started", &self.started.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Refresher {
    pub fn new(
        tokens: Arc<TokenStore>,
        cache: Arc<EventCache>,
        source: Arc<dyn CalendarSource>,
    ) -> Self {
        Self {
            tokens,
            cache,
            source,
            gate: Arc::new(Mutex::new(None)),
            started: AtomicU64::new(0),
            in_flight: Arc::new(AtomicBool::new(false)),
            state: Arc::new(RwLock::new(RefreshState::default())),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn cache(&self) -> &EventCache {
        &self.cache
    }

    pub fn has_token(&self) -> bool {
        self.tokens.has_token()
    }

    /// Copy of the attempt bookkeeping.
    pub fn state(&self) -> RefreshState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Everything `GET /api/calendar/status` reports.
    pub fn status(&self) -> RefreshStatus {
        let state = self.state();
        let token = self.tokens.record();
        RefreshStatus {
            has_token: token.token.is_some(),
            token_stored_at: token.stored_at,
            last_fetch: self.cache.last_fetch(),
            event_count: self.cache.len(),
            last_attempt: state.last_attempt,
            last_success: state.last_success,
            consecutive_failures: state.consecutive_failures,
            last_error: state.last_error,
            refreshing: self.in_flight.load(Ordering::SeqCst),
        }
    }

    /// Runs (or joins) one refresh attempt and returns its outcome.
    ///
    /// Dropping the returned future does not cancel a fetch that already
    /// started; it completes and updates the cache on its own.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> RefreshOutcome {
        let arrived = self.started.load(Ordering::SeqCst);
        let last = self.gate.clone().lock_owned().await;

        if let Some((seq, outcome)) = last.as_ref()
            && *seq > arrived
        {
            debug!(%trigger, seq, "joined attempt that started after arrival");
            return outcome.clone();
        }

        let seq = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let attempt = Attempt {
            tokens: self.tokens.clone(),
            cache: self.cache.clone(),
            source: self.source.clone(),
            in_flight: self.in_flight.clone(),
            state: self.state.clone(),
        };
        let span = info_span!("refresh", %trigger, seq);
        let task = tokio::spawn(attempt.run(seq, last).instrument(span));

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%trigger, seq, error = %e, "refresh task did not complete");
                let message = format!("refresh interrupted: {e}");
                update_state(&self.state, |s| s.record_failure(message.clone()));
                RefreshOutcome::Interrupted(message)
            }
        }
    }
}

impl Attempt {
    /// Runs the attempt and publishes its outcome through `gate` before
    /// releasing it.
    async fn run(
        self,
        seq: u64,
        mut gate: OwnedMutexGuard<Option<(u64, RefreshOutcome)>>,
    ) -> RefreshOutcome {
        let outcome = self.execute().await;
        *gate = Some((seq, outcome.clone()));
        outcome
    }

    async fn execute(&self) -> RefreshOutcome {
        let Some(token) = self.tokens.get() else {
            info!("no token available, skipping calendar refresh");
            update_state(&self.state, RefreshState::record_skipped);
            return RefreshOutcome::NoToken;
        };

        let fetched = {
            let _in_flight = InFlight::enter(&self.in_flight);
            debug!(source = self.source.name(), "fetching calendar events");
            self.source.fetch(&token).await
        };

        match fetched {
            Ok(events) => {
                let count = events.len();
                match self.cache.replace(events) {
                    Ok(fetched_at) => {
                        update_state(&self.state, RefreshState::record_success);
                        RefreshOutcome::Refreshed { count, fetched_at }
                    }
                    Err(e) => {
                        warn!(error = %e, "fetched events could not be cached");
                        let message = e.to_string();
                        update_state(&self.state, |s| s.record_failure(message.clone()));
                        RefreshOutcome::Unsaved(message)
                    }
                }
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "calendar refresh failed");
                if e.invalidates_token()
                    && let Err(store_err) = self.tokens.clear_if_current(&token)
                {
                    warn!(error = %store_err, "failed to persist cleared token");
                }
                update_state(&self.state, |s| s.record_failure(e.to_string()));
                RefreshOutcome::Failed(e)
            }
        }
    }
}

fn update_state(state: &RwLock<RefreshState>, f: impl FnOnce(&mut RefreshState)) {
    f(&mut state.write().unwrap_or_else(PoisonError::into_inner));
}
