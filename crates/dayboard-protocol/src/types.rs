//! Request and response bodies of the calendar relay.

use chrono::{DateTime, Utc};
use dayboard_core::Event;
use serde::{Deserialize, Serialize};

/// Body of `GET /api/calendar/events`.
///
/// `last_fetch` is `null` until the first successful refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub last_fetch: Option<DateTime<Utc>>,
}

impl EventsResponse {
    pub fn new(events: Vec<Event>, last_fetch: Option<DateTime<Utc>>) -> Self {
        Self { events, last_fetch }
    }
}

/// Body of `POST /api/calendar/token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenRequest {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// The submitted token, if present and not blank.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Outcome body of the token and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    /// A successful outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A refresh that ran but did not succeed. `error` names the failure.
    pub fn failed(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            error,
        }
    }

    /// A request refused before any state was touched.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Body of `GET /api/calendar/status`.
///
/// The token itself is never exposed, only whether one is held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStatus {
    pub has_token: bool,
    pub token_stored_at: Option<DateTime<Utc>>,
    pub last_fetch: Option<DateTime<Utc>>,
    pub event_count: usize,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub refreshing: bool,
}
