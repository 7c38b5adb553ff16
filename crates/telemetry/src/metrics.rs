//! In-process counters, gauges and latency histograms.
//!
//! Exposed through the health endpoint and logged by the scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.inc_by(1);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Up/down count of live resources, such as open sockets.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Saturates at zero.
    pub fn dec(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }
}

/// Upper bounds of the latency buckets, in milliseconds. The last bucket
/// also takes everything slower.
const LATENCY_BOUNDS_MS: [u64; 10] = [5, 10, 25, 50, 100, 250, 500, 1_000, 5_000, 30_000];

/// Store query latency distribution.
#[derive(Debug, Default)]
pub struct Histogram {
    buckets: [AtomicU64; LATENCY_BOUNDS_MS.len()],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = LATENCY_BOUNDS_MS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(LATENCY_BOUNDS_MS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            count => self.sum.load(Ordering::Relaxed) as f64 / count as f64,
        }
    }

    /// `(upper bound, count)` per bucket.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        LATENCY_BOUNDS_MS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }

    /// Upper bound of the bucket holding the `q` quantile, 0 when empty.
    pub fn quantile_upper_bound(&self, q: f64) -> u64 {
        let count = self.count();
        if count == 0 {
            return 0;
        }
        let rank = ((count as f64) * q.clamp(0.0, 1.0)).ceil().max(1.0) as u64;

        let mut seen = 0;
        for (bound, n) in self.buckets() {
            seen += n;
            if seen >= rank {
                return bound;
            }
        }
        LATENCY_BOUNDS_MS[LATENCY_BOUNDS_MS.len() - 1]
    }
}

/// Collected metrics for the dashboard service.
#[derive(Debug, Default)]
pub struct Metrics {
    // Request metrics
    pub overview_requests: Counter,
    pub chart_requests: Counter,
    pub summary_requests: Counter,
    pub realtime_requests: Counter,
    pub list_requests: Counter,
    pub rate_limited_requests: Counter,

    // Store metrics
    pub events_fetched: Counter,
    pub store_errors: Counter,
    pub events_created: Counter,
    pub events_deleted: Counter,

    // Realtime feed metrics
    pub realtime_broadcasts: Counter,

    // Latency histograms
    pub query_latency_ms: Histogram,

    // Gauges
    pub ws_clients: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub overview_requests: u64,
    pub chart_requests: u64,
    pub summary_requests: u64,
    pub realtime_requests: u64,
    pub list_requests: u64,
    pub rate_limited_requests: u64,
    pub events_fetched: u64,
    pub store_errors: u64,
    pub events_created: u64,
    pub events_deleted: u64,
    pub realtime_broadcasts: u64,
    pub query_latency_mean_ms: f64,
    pub query_latency_p95_ms: u64,
    pub ws_clients: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            overview_requests: self.overview_requests.get(),
            chart_requests: self.chart_requests.get(),
            summary_requests: self.summary_requests.get(),
            realtime_requests: self.realtime_requests.get(),
            list_requests: self.list_requests.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            events_fetched: self.events_fetched.get(),
            store_errors: self.store_errors.get(),
            events_created: self.events_created.get(),
            events_deleted: self.events_deleted.get(),
            realtime_broadcasts: self.realtime_broadcasts.get(),
            query_latency_mean_ms: self.query_latency_ms.mean(),
            query_latency_p95_ms: self.query_latency_ms.quantile_upper_bound(0.95),
            ws_clients: self.ws_clients.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
