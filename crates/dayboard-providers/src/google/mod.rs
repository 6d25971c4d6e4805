//! Google Calendar as a [`CalendarSource`].

mod client;

use std::time::Duration;

use dayboard_core::{Event, TimeWindow};
use tracing::debug;

pub use client::{DEFAULT_API_BASE, GoogleCalendarClient, MAX_RESULTS};

use crate::error::FetchResult;
use crate::normalize::normalize_items;
use crate::provider::{BoxFuture, CalendarSource};

/// Today's events from the token owner's primary calendar.
#[derive(Debug, Clone)]
pub struct GoogleCalendarSource {
    client: GoogleCalendarClient,
}

impl GoogleCalendarSource {
    pub fn new(client: GoogleCalendarClient) -> Self {
        Self { client }
    }

    /// Source against `base_url` (normally [`DEFAULT_API_BASE`]).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        Ok(Self::new(GoogleCalendarClient::new(base_url, timeout)?))
    }

    /// Fetches and normalizes the events in `window`.
    pub async fn fetch_window(&self, token: &str, window: TimeWindow) -> FetchResult<Vec<Event>> {
        let items = self.client.list_events(token, window).await?;
        let received = items.len();
        let events = normalize_items(items);
        debug!(received, kept = events.len(), "normalized calendar items");
        Ok(events)
    }
}

impl CalendarSource for GoogleCalendarSource {
    fn name(&self) -> &str {
        "google"
    }

    fn fetch<'a>(&'a self, token: &'a str) -> BoxFuture<'a, FetchResult<Vec<Event>>> {
        Box::pin(self.fetch_window(token, TimeWindow::today()))
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::routing::get;
    use chrono::{NaiveDate, Utc};

    use super::*;

    #[tokio::test]
    async fn fetch_window_maps_and_colors() {
        let router = Router::new().route(
            "/calendars/primary/events",
            get(|| async {
                r#"{"items":[
                    {"id":"a1","summary":"Standup","start":{"dateTime":"2024-03-15T09:00:00Z"},"end":{"dateTime":"2024-03-15T09:15:00Z"}},
                    {"id":"b2","start":{"date":"2024-03-15"},"end":{"date":"2024-03-16"}}
                ]}"#
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let source =
            GoogleCalendarSource::with_base_url(format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let window = TimeWindow::for_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), &Utc);
        let events = source.fetch_window("tok", window).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].color_class, "bg-cyan-500");
        assert_eq!(events[1].summary, "No Title");
        assert_eq!(events[1].color_class, "bg-orange-500");
        assert_eq!(source.name(), "google");
    }
}
