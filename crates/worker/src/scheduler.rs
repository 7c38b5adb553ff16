//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use analytics_core::{Aggregator, EventSource, RealtimeFeed};
use chrono::Utc;
use telemetry::metrics;

use crate::realtime::RealtimeWorker;
use crate::store_health::StoreHealthWorker;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Realtime snapshot poll interval
    pub realtime_poll_interval: Duration,
    /// Store health probe interval
    pub health_check_interval: Duration,
    /// Metrics log interval
    pub metrics_log_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            realtime_poll_interval: Duration::from_secs(300), // 5 minutes
            health_check_interval: Duration::from_secs(15),
            metrics_log_interval: Duration::from_secs(60), // 1 minute
        }
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    source: Arc<dyn EventSource>,
    feed: RealtimeFeed,
}

impl WorkerScheduler {
    pub fn new(config: WorkerConfig, source: Arc<dyn EventSource>, feed: RealtimeFeed) -> Self {
        Self {
            config,
            source,
            feed,
        }
    }

    /// Starts all background workers.
    pub fn start(self: Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_realtime_worker().await;
        }));

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_health_worker().await;
        }));

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_metrics_log().await;
        }));

        info!("Background workers started");
        handles
    }

    async fn run_realtime_worker(&self) {
        let worker = RealtimeWorker::new(Aggregator::new(self.source.clone()), self.feed.clone());
        let mut ticker = interval(self.config.realtime_poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(e) = worker.run(Utc::now()).await {
                error!("Realtime worker error: {}", e);
            }
        }
    }

    async fn run_health_worker(&self) {
        let worker = StoreHealthWorker::new(self.source.clone());
        let mut ticker = interval(self.config.health_check_interval);

        loop {
            ticker.tick().await;
            worker.check().await;
        }
    }

    async fn run_metrics_log(&self) {
        let mut ticker = interval(self.config.metrics_log_interval);

        loop {
            ticker.tick().await;

            let snapshot = metrics().snapshot();
            info!(
                overview_requests = snapshot.overview_requests,
                chart_requests = snapshot.chart_requests,
                summary_requests = snapshot.summary_requests,
                events_fetched = snapshot.events_fetched,
                store_errors = snapshot.store_errors,
                query_latency_mean_ms = snapshot.query_latency_mean_ms,
                query_latency_p95_ms = snapshot.query_latency_p95_ms,
                ws_clients = snapshot.ws_clients,
                "Metrics"
            );
        }
    }
}
