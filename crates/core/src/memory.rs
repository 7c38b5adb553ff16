//! In-process event store for development mode and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::events::{Event, EventFilter};
use crate::store::{EventSource, EventStore, ListQuery, Page};

/// Vector-backed store. Clones share the same events.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Arc<RwLock<Vec<Event>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: Arc::new(RwLock::new(events)),
        }
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn extend(&self, events: impl IntoIterator<Item = Event>) {
        self.events.write().extend(events);
    }
}

#[async_trait]
impl EventSource for MemoryStore {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert(&self, event: Event) -> Result<()> {
        self.events.write().push(event);
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Page<Event>> {
        let mut matching: Vec<Event> = self
            .events
            .read()
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(Page {
            items,
            total,
            page: query.page,
            limit: query.limit,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Event>> {
        let mut events = self.events.write();
        Ok(events
            .iter()
            .position(|e| e.id == id)
            .map(|idx| events.remove(idx)))
    }
}
