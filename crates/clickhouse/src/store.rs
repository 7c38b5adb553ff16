//! ClickHouse-backed event store.

use crate::client::ClickHouseClient;
use crate::{health, insert, query};
use analytics_core::{
    Error, Event, EventFilter, EventSource, EventStore, ListQuery, Page, Result,
};
use async_trait::async_trait;
use telemetry::metrics;
use uuid::Uuid;

/// Event store over the `events` table.
#[derive(Clone)]
pub struct ClickHouseStore {
    client: ClickHouseClient,
}

impl ClickHouseStore {
    pub fn new(client: ClickHouseClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ClickHouseClient {
        &self.client
    }
}

#[async_trait]
impl EventSource for ClickHouseStore {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let events = query::fetch_events(&self.client, filter).await?;
        metrics().events_fetched.inc_by(events.len() as u64);
        Ok(events)
    }

    async fn ping(&self) -> Result<()> {
        if health::check_connection(&self.client).await {
            Ok(())
        } else {
            Err(Error::data_source_unavailable("ClickHouse is not reachable"))
        }
    }
}

#[async_trait]
impl EventStore for ClickHouseStore {
    async fn insert(&self, event: Event) -> Result<()> {
        insert::insert_event(&self.client, &event).await
    }

    async fn list(&self, list: &ListQuery) -> Result<Page<Event>> {
        let (items, total) = tokio::try_join!(
            query::list_events(&self.client, list),
            query::count_events(&self.client, list),
        )?;

        Ok(Page {
            items,
            total,
            page: list.page,
            limit: list.limit,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Event>> {
        let Some(event) = query::get_event(&self.client, id).await? else {
            return Ok(None);
        };
        insert::delete_event(&self.client, id).await?;
        Ok(Some(event))
    }
}
