//! Read queries against the events table.

use crate::client::ClickHouseClient;
use crate::insert::EventRow;
use crate::client::run;
use analytics_core::{Event, EventFilter, ListQuery, Result};
use clickhouse::query::Query;
use tracing::warn;
use uuid::Uuid;

const EVENT_COLUMNS: &str =
    "id, metric, value, category, toUnixTimestamp64Milli(date) AS date, metadata, source";

/// WHERE clause for an aggregation read. The window is half-open.
pub fn filter_clause(filter: &EventFilter) -> String {
    let mut clause = String::from(
        "date >= fromUnixTimestamp64Milli(toInt64(?), 'UTC') \
         AND date < fromUnixTimestamp64Milli(toInt64(?), 'UTC')",
    );
    if filter.metric.is_some() {
        clause.push_str(" AND metric = ?");
    }
    if filter.category.is_some() {
        clause.push_str(" AND category = ?");
    }
    clause
}

fn bind_filter(mut query: Query, filter: &EventFilter) -> Query {
    query = query
        .bind(filter.window.start.timestamp_millis())
        .bind(filter.window.end.timestamp_millis());
    if let Some(metric) = filter.metric {
        query = query.bind(metric.as_str());
    }
    if let Some(ref category) = filter.category {
        query = query.bind(category.as_str());
    }
    query
}

/// WHERE clause for a listing. Date bounds are inclusive.
pub fn list_clause(list: &ListQuery) -> String {
    let mut conditions = vec!["1 = 1"];
    if list.metric.is_some() {
        conditions.push("metric = ?");
    }
    if list.category.is_some() {
        conditions.push("category = ?");
    }
    if list.start.is_some() {
        conditions.push("date >= fromUnixTimestamp64Milli(toInt64(?), 'UTC')");
    }
    if list.end.is_some() {
        conditions.push("date <= fromUnixTimestamp64Milli(toInt64(?), 'UTC')");
    }
    conditions.join(" AND ")
}

fn bind_list(mut query: Query, list: &ListQuery) -> Query {
    if let Some(metric) = list.metric {
        query = query.bind(metric.as_str());
    }
    if let Some(ref category) = list.category {
        query = query.bind(category.as_str());
    }
    if let Some(start) = list.start {
        query = query.bind(start.timestamp_millis());
    }
    if let Some(end) = list.end {
        query = query.bind(end.timestamp_millis());
    }
    query
}

/// Rows that no longer decode (e.g. a retired metric name) are skipped.
fn decode(rows: Vec<EventRow>) -> Vec<Event> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match Event::try_from(row) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(%id, error = %e, "Skipping undecodable event row");
                    None
                }
            }
        })
        .collect()
}

/// Fetch every event matching an aggregation filter.
pub async fn fetch_events(client: &ClickHouseClient, filter: &EventFilter) -> Result<Vec<Event>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {}",
        EVENT_COLUMNS,
        client.events_table(),
        filter_clause(filter)
    );
    let query = bind_filter(client.inner().query(&sql), filter);

    let rows: Vec<EventRow> = run(client, query.fetch_all()).await?;
    Ok(decode(rows))
}

/// Fetch one page of a listing.
pub async fn list_events(client: &ClickHouseClient, list: &ListQuery) -> Result<Vec<Event>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} {} LIMIT ? OFFSET ?",
        EVENT_COLUMNS,
        client.events_table(),
        list_clause(list),
        list.sort_by.column(),
        list.sort_order.keyword()
    );
    let query = bind_list(client.inner().query(&sql), list)
        .bind(list.limit)
        .bind(list.offset());

    let rows: Vec<EventRow> = run(client, query.fetch_all()).await?;
    Ok(decode(rows))
}

/// Count events matching a listing, ignoring paging.
pub async fn count_events(client: &ClickHouseClient, list: &ListQuery) -> Result<u64> {
    let sql = format!(
        "SELECT count() FROM {} WHERE {}",
        client.events_table(),
        list_clause(list)
    );
    let query = bind_list(client.inner().query(&sql), list);

    run(client, query.fetch_one::<u64>()).await
}

/// Fetch one event by ID.
pub async fn get_event(client: &ClickHouseClient, id: Uuid) -> Result<Option<Event>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ? LIMIT 1",
        EVENT_COLUMNS,
        client.events_table()
    );
    let query = client.inner().query(&sql).bind(id.to_string());

    let rows: Vec<EventRow> = run(client, query.fetch_all()).await?;
    Ok(decode(rows).into_iter().next())
}
