//! Query windows for calendar fetches.
//!
//! The dashboard only ever shows one day, so the window that matters is
//! `[start of today, start of tomorrow)` in the viewer's local time zone,
//! expressed in UTC for the upstream query.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window, swapping the bounds if they are reversed.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// The calendar day `date` in time zone `tz`: from local midnight to the
    /// following local midnight.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        let next = date.succ_opt().unwrap_or(date);
        Self::new(local_midnight(date, tz), local_midnight(next, tz))
    }

    /// The local day containing `now`.
    pub fn day_containing<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Self {
        Self::for_date(now.with_timezone(tz).date_naive(), tz)
    }

    /// Today in the process-local time zone.
    pub fn today() -> Self {
        Self::day_containing(Utc::now(), &Local)
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Resolves local midnight of `date`, tolerating zones where midnight is
/// skipped or repeated by a DST transition.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight: NaiveDateTime = date.and_time(chrono::NaiveTime::MIN);
    if let Some(resolved) = tz.from_local_datetime(&midnight).earliest() {
        return resolved.with_timezone(&Utc);
    }
    // Midnight does not exist locally; the day starts at the first valid hour.
    let one_am = midnight + Duration::hours(1);
    match tz.from_local_datetime(&one_am).earliest() {
        Some(resolved) => resolved.with_timezone(&Utc),
        None => {
            warn!(%date, "no valid local start of day, falling back to UTC midnight");
            midnight.and_utc()
        }
    }
}
