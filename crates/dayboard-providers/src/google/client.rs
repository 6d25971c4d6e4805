//! Google Calendar API client.
//!
//! One call, `events.list` on the primary calendar, with the response
//! status classified into [`FetchError`].

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use dayboard_core::TimeWindow;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{FetchError, FetchResult, classify_forbidden, upstream_message};
use crate::normalize::{ApiEvent, EventListResponse};

/// Base URL for Google Calendar API v3.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar queried on behalf of the token's owner.
const CALENDAR_ID: &str = "primary";

/// Upper bound on items per fetch; a day view never needs more.
pub const MAX_RESULTS: u32 = 20;

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarClient {
    /// Creates a client against `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::upstream(None, format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists the primary calendar's events starting inside `window`.
    pub async fn list_events(&self, token: &str, window: TimeWindow) -> FetchResult<Vec<ApiEvent>> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(CALENDAR_ID)
        );
        debug!(
            time_min = %window.start,
            window_hours = window.duration().num_hours(),
            "events.list request"
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("timeMin", iso(window.start)),
                ("timeMax", iso(window.end)),
                ("showDeleted", "false".to_string()),
                ("singleEvents", "true".to_string()),
                ("maxResults", MAX_RESULTS.to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::upstream(None, "request timed out")
                } else if e.is_connect() {
                    FetchError::upstream(None, format!("connection failed: {e}"))
                } else {
                    FetchError::upstream(None, format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::TokenExpired);
        }

        let body = response.text().await.map_err(|e| {
            FetchError::upstream(Some(status.as_u16()), format!("failed to read response: {e}"))
        })?;

        if status == StatusCode::FORBIDDEN {
            return Err(classify_forbidden(&body));
        }

        if !status.is_success() {
            let message = upstream_message(&body).unwrap_or_else(|| {
                format!(
                    "Failed to fetch calendar: {}",
                    status.canonical_reason().unwrap_or(status.as_str())
                )
            });
            return Err(FetchError::upstream(Some(status.as_u16()), message));
        }

        let list: EventListResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::upstream(Some(status.as_u16()), format!("failed to parse response: {e}"))
        })?;

        debug!(count = list.items.len(), "events.list returned");
        Ok(list.items)
    }
}

/// RFC 3339 with milliseconds and a `Z` suffix.
fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
