//! ClickHouse table schemas.
//!
//! - LowCardinality for the metric name and source
//! - DateTime64(3, 'UTC') for millisecond precision
//! - metadata stored as a JSON string

/// Name of the raw events table.
pub const EVENTS_TABLE: &str = "events";

/// SQL for creating the database.
pub fn create_database(database: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {database}")
}

/// SQL for creating the events table.
///
/// Ordered by `(metric, date)` so the aggregator's window and metric filters
/// hit the primary key.
pub fn create_events_table(database: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {database}.{EVENTS_TABLE} (
    id String,
    metric LowCardinality(String),
    value Float64,
    category String,
    date DateTime64(3, 'UTC'),
    metadata String,
    source LowCardinality(String),
    created_at DateTime DEFAULT now()
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(date)
ORDER BY (metric, date, id)
SETTINGS index_granularity = 8192
"#
    )
}

/// All DDL statements, in execution order.
pub fn all_tables(database: &str) -> Vec<String> {
    vec![create_database(database), create_events_table(database)]
}
