//! Date windows and calendar-day bucketing.
//!
//! All day bucketing uses UTC. An event at `2024-03-01T23:30:00-02:00` is
//! bucketed on `2024-03-02`.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Format used for calendar-day keys in every response.
pub const CALENDAR_DAY_FORMAT: &str = "%Y-%m-%d";

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Creates a window. An `end` before `start` collapses to an empty window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// `[reference - days_back days, reference)`. The start saturates at the
    /// earliest representable instant.
    pub fn trailing_days(days_back: u32, reference: DateTime<Utc>) -> Self {
        Self::new(
            saturating_sub(reference, Duration::days(i64::from(days_back))),
            reference,
        )
    }

    /// The full UTC calendar day `[00:00, next 00:00)`.
    pub fn for_day(day: NaiveDate) -> Self {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        Self::new(start, start + Duration::days(1))
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    /// The immediately preceding window of identical duration.
    pub fn previous(&self) -> Self {
        Self::new(saturating_sub(self.start, self.duration()), self.start)
    }

    /// Calendar days covered by the window, ascending.
    ///
    /// Yields `ceil(duration / 1 day)` days ending at the day of the last
    /// instant inside the window. For `[now - N days, now)` that is the N days
    /// ending today.
    pub fn calendar_days(&self) -> Vec<NaiveDate> {
        if self.is_empty() {
            return Vec::new();
        }

        let duration = self.duration();
        let whole_days = duration.num_days();
        let count = if duration > Duration::days(whole_days) {
            whole_days + 1
        } else {
            whole_days
        };

        let last = day_of(self.end - Duration::nanoseconds(1));
        (0..count)
            .rev()
            .map(|offset| last - Duration::days(offset))
            .collect()
    }
}

fn saturating_sub(ts: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    ts.checked_sub_signed(delta)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// `[reference - days_back days, reference)`. Zero days yields an empty window.
pub fn derive_window(days_back: u32, reference: DateTime<Utc>) -> DateWindow {
    DateWindow::trailing_days(days_back, reference)
}

/// UTC calendar day of an instant.
pub fn day_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// `YYYY-MM-DD` key for an instant, in UTC.
pub fn calendar_day(ts: DateTime<Utc>) -> String {
    format_day(day_of(ts))
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(CALENDAR_DAY_FORMAT).to_string()
}
