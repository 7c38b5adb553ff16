//! Response assemblers for the overview, chart, summary and realtime views.
//!
//! Every assembler is a pure function of an event snapshot and a reference
//! instant; the same inputs always produce the same output.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    summarize_by_category, summarize_by_metric, summarize_by_metric_and_day, CategorySummary,
    MetricSummary, TrendPoint,
};
use crate::events::Event;
use crate::growth::compute_growth;
use crate::limits::{OVERVIEW_WINDOW_DAYS, REALTIME_EVENT_LIMIT, REALTIME_WINDOW_MINUTES};
use crate::metric::{Metric, MetricSelector};
use crate::params::DaysBack;
use crate::series::{build_dense_series, SeriesPoint};
use crate::window::{day_of, derive_window, DateWindow};

/// Headline numbers over the trailing overview window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_users: f64,
    pub total_sales: f64,
    pub conversion_rate: f64,
}

/// Growth against the preceding window of the same length, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    pub revenue: f64,
    pub users: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResult {
    pub kpis: Kpis,
    pub growth: Growth,
    pub today_count: u64,
    pub last_update: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    pub metric: String,
    pub period: String,
    pub data: Vec<SeriesPoint>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub metrics: Vec<MetricSummary>,
    pub categories: Vec<CategorySummary>,
    pub trends: Vec<TrendPoint>,
    pub period: String,
}

/// Most recent events, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeSnapshot {
    pub data: Vec<Event>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// The three windows an overview reads: trailing, preceding, and today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverviewWindows {
    pub current: DateWindow,
    pub previous: DateWindow,
    pub today: DateWindow,
}

impl OverviewWindows {
    pub fn at(as_of: DateTime<Utc>) -> Self {
        let current = derive_window(OVERVIEW_WINDOW_DAYS, as_of);
        Self {
            current,
            previous: current.previous(),
            today: DateWindow::for_day(day_of(as_of)),
        }
    }
}

/// Window read for a realtime snapshot.
pub fn realtime_window(as_of: DateTime<Utc>) -> DateWindow {
    DateWindow::new(as_of - Duration::minutes(REALTIME_WINDOW_MINUTES), as_of)
}

/// Overview from one snapshot holding at least the last 60 days and today.
pub fn build_overview(events: &[Event], as_of: DateTime<Utc>) -> OverviewResult {
    assemble_overview(events, events, events, as_of)
}

/// Overview from separately fetched window reads.
///
/// Each slice only needs to cover its own window; events outside it are
/// ignored, so overlapping slices never double count.
pub fn assemble_overview(
    current: &[Event],
    previous: &[Event],
    today: &[Event],
    as_of: DateTime<Utc>,
) -> OverviewResult {
    let windows = OverviewWindows::at(as_of);
    let current = summarize_by_metric(current, &windows.current);
    let previous = summarize_by_metric(previous, &windows.previous);

    let total = |summary: &std::collections::BTreeMap<Metric, MetricSummary>, metric| {
        summary.get(&metric).map_or(0.0, |s| s.total)
    };

    let kpis = Kpis {
        total_revenue: total(&current, Metric::Revenue),
        total_users: total(&current, Metric::Users),
        total_sales: total(&current, Metric::Sales),
        conversion_rate: current.get(&Metric::Conversion).map_or(0.0, |s| s.average),
    };

    let growth = Growth {
        revenue: compute_growth(
            total(&previous, Metric::Revenue),
            total(&current, Metric::Revenue),
        ),
        users: compute_growth(total(&previous, Metric::Users), total(&current, Metric::Users)),
    };

    let today_count = today
        .iter()
        .filter(|e| windows.today.contains(e.date))
        .count() as u64;

    OverviewResult {
        kpis,
        growth,
        today_count,
        last_update: as_of,
    }
}

/// Dense chart over the trailing `days_back` days ending at `as_of`.
pub fn build_chart_response(
    events: &[Event],
    selector: &MetricSelector,
    days_back: DaysBack,
    category: Option<&str>,
    as_of: DateTime<Utc>,
) -> ChartResult {
    let window = derive_window(days_back.get(), as_of);
    let series = build_dense_series(events, selector, &window, category);

    ChartResult {
        metric: selector.label().to_string(),
        period: days_back.period_label(),
        data: series.data,
        total: series.total,
    }
}

/// Metric, category and trend groupings over one trailing window.
pub fn build_summary_response(
    events: &[Event],
    days_back: DaysBack,
    as_of: DateTime<Utc>,
) -> SummaryResult {
    let window = derive_window(days_back.get(), as_of);

    SummaryResult {
        metrics: summarize_by_metric(events, &window).into_values().collect(),
        categories: summarize_by_category(events, &window).into_values().collect(),
        trends: summarize_by_metric_and_day(events, &window),
        period: days_back.period_label(),
    }
}

/// Events of the last few minutes, newest first, capped.
pub fn build_realtime_snapshot(events: &[Event], as_of: DateTime<Utc>) -> RealtimeSnapshot {
    let window = realtime_window(as_of);
    let mut recent: Vec<Event> = events
        .iter()
        .filter(|e| window.contains(e.date))
        .cloned()
        .collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(REALTIME_EVENT_LIMIT);

    RealtimeSnapshot {
        count: recent.len(),
        data: recent,
        timestamp: as_of,
    }
}
