//! Periodic realtime snapshot publisher.

use analytics_core::{Aggregator, RealtimeFeed, RealtimeUpdate, Result};
use chrono::{DateTime, Utc};
use telemetry::metrics;
use tracing::debug;

/// Computes the overview and the recent events, then publishes both.
pub struct RealtimeWorker {
    aggregator: Aggregator,
    feed: RealtimeFeed,
}

impl RealtimeWorker {
    pub fn new(aggregator: Aggregator, feed: RealtimeFeed) -> Self {
        Self { aggregator, feed }
    }

    /// One poll. Returns how many subscribers received the snapshot.
    ///
    /// Skips the store entirely when nobody is listening.
    pub async fn run(&self, as_of: DateTime<Utc>) -> Result<usize> {
        if self.feed.subscriber_count() == 0 {
            debug!("No stream subscribers, skipping realtime poll");
            return Ok(0);
        }

        let (overview, recent) = tokio::try_join!(
            self.aggregator.overview(as_of),
            self.aggregator.realtime(as_of),
        )?;

        let delivered = self
            .feed
            .publish(RealtimeUpdate::Snapshot { overview, recent });
        metrics().realtime_broadcasts.inc();

        debug!(delivered, "Published realtime snapshot");
        Ok(delivered)
    }
}
