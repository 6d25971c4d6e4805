//! Calendar commands: login, logout, events, refresh, status, watch.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use dayboard_core::{Event, TimeWindow};
use dayboard_protocol::{EventsResponse, RefreshStatus};
use dayboard_providers::GoogleCalendarSource;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::poller::{ClientPoller, PollResult, Snapshot, SnapshotSource};
use crate::relay_client::RelayClient;
use crate::session::SessionToken;

fn relay(config: &ClientConfig) -> ClientResult<RelayClient> {
    RelayClient::new(&config.relay.url, config.relay_timeout())
}

/// Builds the poller described by `config`.
pub fn poller(config: &ClientConfig, interval: Duration) -> ClientResult<ClientPoller> {
    let poller = ClientPoller::new(
        relay(config)?,
        SessionToken::new(config.session_file()),
        interval,
    );
    if !config.poller.fallback {
        return Ok(poller);
    }
    let source = GoogleCalendarSource::with_base_url(
        &config.poller.api_base_url,
        Duration::from_secs(config.poller.upstream_timeout),
    )?;
    Ok(poller.with_fallback(Arc::new(source)))
}

/// Keeps `token` for this session, then hands it to the relay.
///
/// An unreachable relay is not an error: the token still serves the
/// direct-fetch fallback.
pub async fn login(config: &ClientConfig, token: &str) -> ClientResult<()> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ClientError::Input("No token provided".into()));
    }
    let session = SessionToken::new(config.session_file());
    session.set(token)?;
    info!(path = %session.path().display(), "session token stored");

    match relay(config)?.submit_token(token).await {
        Ok(reply) if reply.success => {
            println!("{}", reply.message.as_deref().unwrap_or("Token stored"));
            Ok(())
        }
        Ok(reply) => Err(ClientError::Rejected(relay_failure(
            reply.message.as_deref(),
            reply.error.as_deref(),
        ))),
        Err(e) => {
            warn!(error = %e, "relay unavailable, token kept for direct fetches");
            println!("Token kept for this session; relay unavailable ({e}).");
            Ok(())
        }
    }
}

/// Forgets the session token. The relay keeps its own copy.
pub fn logout(config: &ClientConfig) -> ClientResult<()> {
    SessionToken::new(config.session_file()).clear()?;
    println!("Signed out.");
    Ok(())
}

/// Prints today's events once.
pub async fn events(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let snapshot = poller(config, config.poll_interval())?
        .poll_once()
        .await
        .map_err(|failure| ClientError::Rejected(failure.to_string()))?;
    if json {
        return super::print_json(&EventsResponse::new(snapshot.events, snapshot.last_fetch));
    }
    print!("{}", render_day(&snapshot, Utc::now()));
    Ok(())
}

/// Asks the relay for an immediate refresh.
pub async fn refresh(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let reply = relay(config)?.refresh().await?;
    if json {
        super::print_json(&reply)?;
    } else if reply.success {
        println!("{}", reply.message.as_deref().unwrap_or("Calendar refreshed"));
    }
    if reply.success {
        Ok(())
    } else {
        Err(ClientError::Rejected(relay_failure(
            reply.message.as_deref(),
            reply.error.as_deref(),
        )))
    }
}

/// Prints the relay's refresh bookkeeping.
pub async fn status(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let status = relay(config)?.status().await?;
    if json {
        return super::print_json(&status);
    }
    print!("{}", render_status(&status));
    Ok(())
}

/// Prints today's events on every poll until interrupted.
pub async fn watch(config: &ClientConfig, interval: Option<u64>, json: bool) -> ClientResult<()> {
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval());
    if interval.is_zero() {
        return Err(ClientError::Input("interval must be greater than zero".into()));
    }

    let handle = poller(config, interval)?.spawn(move |result: PollResult| match result {
        Ok(snapshot) if json => {
            let body = EventsResponse::new(snapshot.events, snapshot.last_fetch);
            if let Err(e) = super::print_json(&body) {
                warn!(error = %e, "failed to print events");
            }
        }
        Ok(snapshot) => {
            println!("{}", Local::now().format("-- %H:%M:%S --"));
            print!("{}", render_day(&snapshot, Utc::now()));
        }
        Err(failure) => eprintln!("{failure}"),
    });

    tokio::signal::ctrl_c().await?;
    handle.stop().await;
    Ok(())
}

fn relay_failure(message: Option<&str>, error: Option<&str>) -> String {
    match (message, error) {
        (Some(message), Some(error)) => format!("{message}: {error}"),
        (Some(message), None) => message.to_string(),
        (None, Some(error)) => error.to_string(),
        (None, None) => "relay reported a failure".to_string(),
    }
}

/// Renders the day timeline in local time, one event per line.
pub fn render_day(snapshot: &Snapshot, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    if snapshot.events.is_empty() {
        out.push_str("No events today.\n");
    }
    for event in &snapshot.events {
        let _ = writeln!(out, "{}", render_event(event, now));
    }
    match (snapshot.source, snapshot.last_fetch) {
        (SnapshotSource::Direct, _) => out.push_str("(fetched directly; relay unavailable)\n"),
        (SnapshotSource::Relay, Some(at)) if TimeWindow::day_containing(now, &Local).contains(at) => {
            let _ = writeln!(out, "(updated {})", at.with_timezone(&Local).format("%H:%M"));
        }
        (SnapshotSource::Relay, Some(at)) => {
            let _ = writeln!(
                out,
                "(stale: relay last fetched {})",
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }
        (SnapshotSource::Relay, None) => out.push_str("(relay has not fetched yet)\n"),
    }
    out
}

fn render_event(event: &Event, now: DateTime<Utc>) -> String {
    let marker = if event.is_ongoing(now) { '>' } else { ' ' };
    format!(
        "{marker} {}  {}  ({} min)  [{}]",
        event.time_range_local(),
        event.summary,
        event.duration_minutes(),
        event.color_class
    )
}

fn render_status(status: &RefreshStatus) -> String {
    let when = |at: Option<DateTime<Utc>>| {
        at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string())
    };
    let mut out = String::new();
    let _ = writeln!(out, "token:         {}", if status.has_token { "held" } else { "none" });
    let _ = writeln!(out, "events:        {}", status.event_count);
    let _ = writeln!(out, "last fetch:    {}", when(status.last_fetch));
    let _ = writeln!(out, "last attempt:  {}", when(status.last_attempt));
    let _ = writeln!(out, "failures:      {}", status.consecutive_failures);
    if let Some(ref error) = status.last_error {
        let _ = writeln!(out, "last error:    {}", error);
    }
    if status.refreshing {
        out.push_str("refresh in progress\n");
    }
    out
}
