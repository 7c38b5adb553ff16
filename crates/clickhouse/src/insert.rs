//! Event row mapping and write helpers.

use crate::client::ClickHouseClient;
use crate::client::run;
use analytics_core::{Error, Event, Metric, Result};
use chrono::{TimeZone, Utc};
use clickhouse::Row;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

/// Flattened event row.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct EventRow {
    pub id: String,
    pub metric: String,
    pub value: f64,
    pub category: String,
    pub date: i64, // DateTime64(3) as milliseconds
    pub metadata: String, // JSON object
    pub source: String,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            metric: event.metric.as_str().to_string(),
            value: event.value,
            category: event.category.clone(),
            date: event.date.timestamp_millis(),
            metadata: Value::Object(event.metadata.clone()).to_string(),
            source: event.source.clone(),
        }
    }
}

impl TryFrom<EventRow> for Event {
    type Error = Error;

    fn try_from(row: EventRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::internal(format!("Invalid event id {:?}: {}", row.id, e)))?;
        let metric = Metric::from_str(&row.metric)?;
        let date = Utc
            .timestamp_millis_opt(row.date)
            .single()
            .ok_or_else(|| Error::internal(format!("Invalid event date {}", row.date)))?;
        let metadata = match serde_json::from_str::<Value>(&row.metadata) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        Ok(Event {
            id,
            metric,
            value: row.value,
            category: row.category,
            date,
            metadata,
            source: row.source,
        })
    }
}

/// Insert one event.
pub async fn insert_event(client: &ClickHouseClient, event: &Event) -> Result<()> {
    let row = EventRow::from(event);

    run(client, async {
        let mut insert = client.inner().insert(client.events_table())?;
        insert.write(&row).await?;
        insert.end().await
    })
    .await?;

    debug!(id = %event.id, metric = %event.metric, "Inserted event");
    Ok(())
}

/// Delete one event by ID. Lightweight deletes are visible to the next read.
pub async fn delete_event(client: &ClickHouseClient, id: Uuid) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?", client.events_table());

    run(client, client.inner().query(&sql).bind(id.to_string()).execute()).await?;

    debug!(%id, "Deleted event");
    Ok(())
}

/// Truncate all events (test cleanup).
pub async fn truncate_events(client: &ClickHouseClient) -> Result<()> {
    let sql = format!("TRUNCATE TABLE IF EXISTS {}", client.events_table());
    run(client, client.inner().query(&sql).execute()).await
}
