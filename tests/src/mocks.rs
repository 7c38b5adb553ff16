//! Mock implementations for testing.

use analytics_core::{
    Error, Event, EventFilter, EventSource, EventStore, ListQuery, MemoryStore, Page, Result,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory store that can be switched into an outage.
///
/// Wraps the real `MemoryStore` so handlers see the same behaviour as in
/// development mode until `set_should_fail(true)`.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    should_fail: Arc<Mutex<bool>>,
    reads: Arc<Mutex<usize>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    /// Number of aggregation reads served or refused.
    pub fn read_count(&self) -> usize {
        *self.reads.lock()
    }

    fn check(&self) -> Result<()> {
        if *self.should_fail.lock() {
            Err(Error::data_source_unavailable("Mock store outage"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EventSource for FlakyStore {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        *self.reads.lock() += 1;
        self.check()?;
        self.inner.fetch_events(filter).await
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

#[async_trait]
impl EventStore for FlakyStore {
    async fn insert(&self, event: Event) -> Result<()> {
        self.check()?;
        self.inner.insert(event).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Page<Event>> {
        self.check()?;
        self.inner.list(query).await
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Event>> {
        self.check()?;
        self.inner.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics_core::{DateWindow, Metric};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_flaky_store_failure_mode() {
        let now = Utc::now();
        let store = FlakyStore::new(MemoryStore::with_events(vec![Event::new(
            Metric::Sales,
            1.0,
            "web",
            now - Duration::hours(1),
        )]));
        let filter = EventFilter::new(DateWindow::new(now - Duration::days(1), now));

        assert_eq!(store.fetch_events(&filter).await.unwrap().len(), 1);

        store.set_should_fail(true);
        let err = store.fetch_events(&filter).await.unwrap_err();
        assert!(err.is_data_source_unavailable());
        assert!(store.ping().await.is_err());
        assert_eq!(store.read_count(), 2);
    }
}
