//! The calendar event shape shared by the relay, the cache and every client.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::color::color_of;

/// Title used when upstream returns an event without a summary.
pub const UNTITLED: &str = "No Title";

/// A calendar event as displayed on the day timeline.
///
/// `color_class` is derived from `id` and never stored independently of it;
/// see [`crate::color`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Upstream-assigned identifier, stable across fetches.
    pub id: String,
    /// Event title.
    pub summary: String,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant.
    pub end: DateTime<Utc>,
    /// Palette entry picked from `id`.
    pub color_class: String,
}

impl Event {
    /// Builds an event, filling in the fallback title and the color.
    pub fn new(
        id: impl Into<String>,
        summary: Option<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        let summary = summary
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        let color_class = color_of(&id).to_string();
        Self {
            id,
            summary,
            start,
            end,
            color_class,
        }
    }

    /// Duration in whole minutes (zero for inverted events).
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes().max(0)
    }

    /// Returns true if the event is running at `now`.
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }

    /// One-line rendering in local time, e.g. `09:00-09:30  Standup`.
    pub fn time_range_local(&self) -> String {
        format!(
            "{}-{}",
            self.start.with_timezone(&Local).format("%H:%M"),
            self.end.with_timezone(&Local).format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    #[test]
    fn missing_summary_becomes_no_title() {
        let event = Event::new("a1", None, at(9, 0), at(10, 0));
        assert_eq!(event.summary, "No Title");

        let event = Event::new("a1", Some(String::new()), at(9, 0), at(10, 0));
        assert_eq!(event.summary, "No Title");
    }

    #[test]
    fn color_follows_id() {
        let a = Event::new("a1", Some("Standup".into()), at(9, 0), at(9, 15));
        let b = Event::new("a1", Some("Renamed".into()), at(11, 0), at(12, 0));
        assert_eq!(a.color_class, "bg-cyan-500");
        assert_eq!(a.color_class, b.color_class);
    }

    #[test]
    fn ongoing_and_duration() {
        let event = Event::new("x", Some("Review".into()), at(11, 0), at(11, 30));
        assert_eq!(event.duration_minutes(), 30);
        assert!(event.is_ongoing(at(11, 10)));
        assert!(!event.is_ongoing(at(11, 30)));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let event = Event::new("b2", Some("Client Meeting".into()), at(14, 0), at(15, 30));
        insta::assert_json_snapshot!(event, @r#"
        {
          "id": "b2",
          "summary": "Client Meeting",
          "start": "2024-03-15T14:00:00Z",
          "end": "2024-03-15T15:30:00Z",
          "colorClass": "bg-orange-500"
        }
        "#);
    }

    #[test]
    fn json_round_trip_keeps_sub_second_precision() {
        let start = Utc.timestamp_millis_opt(1_710_493_200_123).unwrap();
        let event = Event::new("a1", Some("Standup".into()), start, start + chrono::Duration::minutes(15));
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
