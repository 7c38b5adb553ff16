//! Dense per-day series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::events::Event;
use crate::metric::MetricSelector;
use crate::window::{format_day, DateWindow};

/// One calendar day of a dense series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// Gap-free series plus the sum of everything bucketed into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseSeries {
    pub data: Vec<SeriesPoint>,
    pub total: f64,
}

/// Buckets events per calendar day, with a zero for every day that has none.
///
/// The series has one point per entry of [`DateWindow::calendar_days`]. An
/// event inside the window whose day is not one of those days is dropped, so
/// `total` always equals the sum of the points.
pub fn build_dense_series(
    events: &[Event],
    selector: &MetricSelector,
    window: &DateWindow,
    category: Option<&str>,
) -> DenseSeries {
    let mut buckets: BTreeMap<NaiveDate, f64> = window
        .calendar_days()
        .into_iter()
        .map(|day| (day, 0.0))
        .collect();

    let mut total = 0.0;
    let surviving = events.iter().filter(|e| {
        selector.matches(e.metric)
            && window.contains(e.date)
            && category.map_or(true, |c| c == e.category)
    });

    for event in surviving {
        if let Some(bucket) = buckets.get_mut(&event.day()) {
            *bucket += event.value;
            total += event.value;
        }
    }

    DenseSeries {
        data: buckets
            .into_iter()
            .map(|(day, value)| SeriesPoint {
                date: format_day(day),
                value,
            })
            .collect(),
        total,
    }
}
