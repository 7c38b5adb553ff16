//! Realtime update channel between publishers and socket subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::events::Event;
use crate::metric::Metric;
use crate::report::{OverviewResult, RealtimeSnapshot};

/// Default number of buffered updates per subscriber.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Payload pushed to dashboard sockets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeUpdate {
    /// Periodic poll result.
    Snapshot {
        overview: OverviewResult,
        recent: RealtimeSnapshot,
    },
    /// Recent events served by an on-demand realtime read.
    Recent { recent: RealtimeSnapshot },
    /// An event was created through the API.
    NewMetric {
        id: String,
        metric: Metric,
        value: f64,
        category: String,
        timestamp: DateTime<Utc>,
    },
}

impl RealtimeUpdate {
    pub fn new_metric(event: &Event) -> Self {
        Self::NewMetric {
            id: event.id.to_string(),
            metric: event.metric,
            value: event.value,
            category: event.category.clone(),
            timestamp: event.date,
        }
    }
}

/// Fan-out channel. Publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct RealtimeFeed {
    sender: broadcast::Sender<RealtimeUpdate>,
}

impl Default for RealtimeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl RealtimeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers that received the update.
    pub fn publish(&self, update: RealtimeUpdate) -> usize {
        let delivered = self.sender.send(update).unwrap_or(0);
        trace!(delivered, "Published realtime update");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeUpdate> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
