//! Common test setup functions.

use analytics_core::{Event, MemoryStore, RealtimeFeed};
use api::{router, AppState, RateLimitConfig, RouterConfig};
use axum::Router;
use axum_test::{TestServer, TestServerConfig, Transport};
use std::sync::Arc;

use crate::mocks::FlakyStore;

/// Test context with the real router over an in-memory store and mock auth.
///
/// Handlers run the same code paths as production; only the storage engine
/// and the auth service are swapped.
pub struct TestContext {
    pub store: Arc<FlakyStore>,
    pub feed: RealtimeFeed,
    pub router: Router,
}

impl TestContext {
    /// Create a new test context with an empty store.
    pub async fn new() -> Self {
        Self::with_events(Vec::new()).await
    }

    /// Create a context whose store starts with `events`.
    pub async fn with_events(events: Vec<Event>) -> Self {
        Self::build(events, RateLimitConfig::default())
    }

    /// Create a context with a custom rate limit.
    pub async fn with_rate_limit(config: RateLimitConfig) -> Self {
        Self::build(Vec::new(), config)
    }

    fn build(events: Vec<Event>, rate_limit: RateLimitConfig) -> Self {
        let store = Arc::new(FlakyStore::new(MemoryStore::with_events(events)));
        let feed = RealtimeFeed::default();

        let state = AppState::new(store.clone(), "mock", feed.clone()).with_rate_limit(rate_limit);
        let router = router(state, RouterConfig::default());

        Self {
            store,
            feed,
            router,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }

    /// Server on a real socket, needed for WebSocket upgrades.
    pub fn http_server(&self) -> TestServer {
        let config = TestServerConfig {
            transport: Some(Transport::HttpRandomPort),
            ..TestServerConfig::default()
        };
        TestServer::new_with_config(self.router.clone(), config)
            .expect("Failed to create HTTP test server")
    }

    /// Waits until `count` stream clients are subscribed to the feed.
    pub async fn wait_for_subscribers(&self, count: usize) {
        for _ in 0..100 {
            if self.feed.subscriber_count() >= count {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("no stream subscriber after 2s");
    }

    /// Number of events currently stored.
    pub fn stored_event_count(&self) -> usize {
        self.store.inner().len()
    }

    /// Simulate a storage outage.
    pub fn set_store_failure(&self, should_fail: bool) {
        self.store.set_should_fail(should_fail);
    }
}
