//! Metrics aggregator over an injected event source.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::Result;
use crate::events::{Event, EventFilter};
use crate::metric::MetricSelector;
use crate::params::DaysBack;
use crate::report::{
    assemble_overview, build_chart_response, build_realtime_snapshot, build_summary_response,
    realtime_window, ChartResult, OverviewResult, OverviewWindows, RealtimeSnapshot,
    SummaryResult,
};
use crate::store::EventSource;
use crate::window::derive_window;

/// Stateless aggregator. Every call reads fresh events from the source.
///
/// Store failures propagate as `DataSourceUnavailable`; there are no retries.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn EventSource>,
}

impl Aggregator {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self { source }
    }

    async fn fetch(&self, filter: EventFilter) -> Result<Vec<Event>> {
        let start = Instant::now();
        let events = self.source.fetch_events(&filter).await.map_err(|e| {
            warn!(error = %e, "Event source read failed");
            e
        })?;
        debug!(
            events = events.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Fetched events"
        );
        Ok(events)
    }

    /// KPIs, growth and today's count as of `as_of`.
    ///
    /// The current, previous and today windows are read concurrently.
    pub async fn overview(&self, as_of: DateTime<Utc>) -> Result<OverviewResult> {
        let windows = OverviewWindows::at(as_of);

        let (current, previous, today) = tokio::try_join!(
            self.fetch(EventFilter::new(windows.current)),
            self.fetch(EventFilter::new(windows.previous)),
            self.fetch(EventFilter::new(windows.today)),
        )?;

        Ok(assemble_overview(&current, &previous, &today, as_of))
    }

    /// Dense per-day chart for one metric (or `all`).
    pub async fn chart(
        &self,
        selector: &MetricSelector,
        days_back: DaysBack,
        category: Option<&str>,
        as_of: DateTime<Utc>,
    ) -> Result<ChartResult> {
        if let MetricSelector::Unrecognized(name) = selector {
            debug!(metric = %name, "Unrecognized metric, returning zero-filled chart");
            return Ok(build_chart_response(
                &[], selector, days_back, category, as_of,
            ));
        }

        let filter = EventFilter::new(derive_window(days_back.get(), as_of))
            .with_metric(selector.metric())
            .with_category(category.map(str::to_string));
        let events = self.fetch(filter).await?;

        Ok(build_chart_response(
            &events, selector, days_back, category, as_of,
        ))
    }

    /// Metric, category and trend groupings over the trailing window.
    pub async fn summary(&self, days_back: DaysBack, as_of: DateTime<Utc>) -> Result<SummaryResult> {
        let filter = EventFilter::new(derive_window(days_back.get(), as_of));
        let events = self.fetch(filter).await?;
        Ok(build_summary_response(&events, days_back, as_of))
    }

    /// Most recent events, newest first.
    pub async fn realtime(&self, as_of: DateTime<Utc>) -> Result<RealtimeSnapshot> {
        let events = self
            .fetch(EventFilter::new(realtime_window(as_of)))
            .await?;
        Ok(build_realtime_snapshot(&events, as_of))
    }
}
