//! Mapping of Google `events.list` items into [`Event`].
//!
//! Shared by the server refresh path and the client's direct fallback so
//! both produce identical ids, titles and colors.

use chrono::{DateTime, NaiveDate, Utc};
use dayboard_core::Event;
use serde::Deserialize;
use tracing::warn;

/// Body of an `events.list` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

/// One upstream item; only the fields the dashboard shows.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
}

/// `start` / `end` of an item: `dateTime` for timed events, `date` for
/// all-day ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date: Option<String>,
    pub date_time: Option<String>,
}

impl ApiEventTime {
    /// Resolves to an instant. All-day dates are taken as midnight UTC.
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        if let Some(ref dt) = self.date_time {
            return match DateTime::parse_from_rfc3339(dt) {
                Ok(parsed) => Some(parsed.with_timezone(&Utc)),
                Err(e) => {
                    warn!(value = %dt, error = %e, "unparseable dateTime");
                    None
                }
            };
        }
        let date = self.date.as_deref()?;
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(day) => Some(day.and_time(chrono::NaiveTime::MIN).and_utc()),
            Err(e) => {
                warn!(value = %date, error = %e, "unparseable date");
                None
            }
        }
    }
}

/// Maps one item, or `None` (with a warning) if it has no id or no usable
/// start/end.
pub fn normalize_event(item: ApiEvent) -> Option<Event> {
    let Some(id) = item.id.filter(|id| !id.is_empty()) else {
        warn!("skipping calendar item without id");
        return None;
    };
    let Some(start) = item.start.as_ref().and_then(ApiEventTime::to_utc) else {
        warn!(%id, "skipping calendar item without start");
        return None;
    };
    let Some(end) = item.end.as_ref().and_then(ApiEventTime::to_utc) else {
        warn!(%id, "skipping calendar item without end");
        return None;
    };
    Some(Event::new(id, item.summary, start, end))
}

/// Maps every item, keeping upstream order.
pub fn normalize_items(items: Vec<ApiEvent>) -> Vec<Event> {
    items.into_iter().filter_map(normalize_event).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(json: &str) -> Vec<Event> {
        let response: EventListResponse = serde_json::from_str(json).unwrap();
        normalize_items(response.items)
    }

    #[test]
    fn timed_event() {
        let events = parse(
            r#"{"items":[{"id":"a1","summary":"Team Sync",
                "start":{"dateTime":"2024-03-15T09:00:00+01:00"},
                "end":{"dateTime":"2024-03-15T09:30:00+01:00"}}]}"#,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Team Sync");
        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap());
        assert_eq!(events[0].end, Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap());
        assert_eq!(events[0].color_class, "bg-cyan-500");
    }

    #[test]
    fn all_day_event_is_midnight_utc() {
        let events = parse(
            r#"{"items":[{"id":"b2","summary":"Offsite",
                "start":{"date":"2024-03-15"},"end":{"date":"2024-03-16"}}]}"#,
        );
        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(events[0].end, Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap());
    }

    #[test]
    fn date_time_wins_over_date() {
        let events = parse(
            r#"{"items":[{"id":"x","start":{"date":"2024-03-15","dateTime":"2024-03-15T10:00:00Z"},
                "end":{"dateTime":"2024-03-15T11:00:00Z"}}]}"#,
        );
        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn missing_summary_is_no_title() {
        let events = parse(
            r#"{"items":[{"id":"x","summary":"",
                "start":{"dateTime":"2024-03-15T10:00:00Z"},"end":{"dateTime":"2024-03-15T11:00:00Z"}}]}"#,
        );
        assert_eq!(events[0].summary, "No Title");
    }

    #[test]
    fn incomplete_items_are_skipped() {
        let events = parse(
            r#"{"items":[
                {"summary":"no id","start":{"dateTime":"2024-03-15T10:00:00Z"},"end":{"dateTime":"2024-03-15T11:00:00Z"}},
                {"id":"no-start","end":{"dateTime":"2024-03-15T11:00:00Z"}},
                {"id":"no-end","start":{"dateTime":"2024-03-15T10:00:00Z"},"end":{}},
                {"id":"bad","start":{"dateTime":"yesterday"},"end":{"dateTime":"2024-03-15T11:00:00Z"}},
                {"id":"ok","start":{"dateTime":"2024-03-15T10:00:00Z"},"end":{"dateTime":"2024-03-15T11:00:00Z"}}
            ]}"#,
        );
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn missing_items_is_empty() {
        assert!(parse("{}").is_empty());
    }
}
