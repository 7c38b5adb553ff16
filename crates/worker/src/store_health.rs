//! Event store health probe.

use analytics_core::EventSource;
use std::sync::Arc;
use telemetry::health;
use tracing::{info, warn};

/// Pings the store and records the result in the health registry.
pub struct StoreHealthWorker {
    source: Arc<dyn EventSource>,
}

impl StoreHealthWorker {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self { source }
    }

    /// Returns whether the store answered.
    pub async fn check(&self) -> bool {
        let was_healthy = health().store.is_healthy();

        match self.source.ping().await {
            Ok(()) => {
                if !was_healthy {
                    info!("Event store reachable");
                }
                health().store.set_healthy();
                true
            }
            Err(e) => {
                warn!(error = %e, "Event store health check failed");
                health().store.set_unhealthy(e.to_string());
                false
            }
        }
    }
}
