//! Grouping and summation over a window of events.
//!
//! Sums accumulate in input order, so totals are reproducible for a fixed
//! event sequence. Groups without events are never fabricated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::events::Event;
use crate::metric::Metric;
use crate::window::{format_day, DateWindow};

/// Per-metric statistics over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: Metric,
    pub total: f64,
    pub average: f64,
    pub count: u64,
    pub max: f64,
    pub min: f64,
}

impl MetricSummary {
    fn first(metric: Metric, value: f64) -> Self {
        Self {
            metric,
            total: value,
            average: value,
            count: 1,
            max: value,
            min: value,
        }
    }

    fn add(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
        self.max = self.max.max(value);
        self.min = self.min.min(value);
    }
}

/// Per-category statistics over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: f64,
    pub count: u64,
    pub average: f64,
}

/// Total of one metric on one day. Only emitted for pairs with events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub metric: Metric,
    pub date: String,
    pub total: f64,
}

fn in_window<'a>(events: &'a [Event], window: &'a DateWindow) -> impl Iterator<Item = &'a Event> {
    events.iter().filter(move |e| window.contains(e.date))
}

/// Groups events inside `window` by metric.
pub fn summarize_by_metric(events: &[Event], window: &DateWindow) -> BTreeMap<Metric, MetricSummary> {
    let mut groups: BTreeMap<Metric, MetricSummary> = BTreeMap::new();

    for event in in_window(events, window) {
        groups
            .entry(event.metric)
            .and_modify(|s| s.add(event.value))
            .or_insert_with(|| MetricSummary::first(event.metric, event.value));
    }

    for summary in groups.values_mut() {
        summary.average = summary.total / summary.count as f64;
    }

    groups
}

/// Groups events inside `window` by category.
pub fn summarize_by_category(
    events: &[Event],
    window: &DateWindow,
) -> BTreeMap<String, CategorySummary> {
    let mut groups: BTreeMap<String, CategorySummary> = BTreeMap::new();

    for event in in_window(events, window) {
        let summary = groups
            .entry(event.category.clone())
            .or_insert_with(|| CategorySummary {
                category: event.category.clone(),
                total: 0.0,
                count: 0,
                average: 0.0,
            });
        summary.total += event.value;
        summary.count += 1;
    }

    for summary in groups.values_mut() {
        summary.average = summary.total / summary.count as f64;
    }

    groups
}

/// Sparse per-(metric, day) totals, sorted by day then metric identifier.
pub fn summarize_by_metric_and_day(events: &[Event], window: &DateWindow) -> Vec<TrendPoint> {
    let mut groups: BTreeMap<(NaiveDate, Metric), f64> = BTreeMap::new();

    for event in in_window(events, window) {
        *groups.entry((event.day(), event.metric)).or_insert(0.0) += event.value;
    }

    groups
        .into_iter()
        .map(|((day, metric), total)| TrendPoint {
            metric,
            date: format_day(day),
            total,
        })
        .collect()
}
