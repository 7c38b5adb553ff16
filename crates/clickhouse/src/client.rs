//! ClickHouse client wrapper.

use crate::config::ClickHouseConfig;
use crate::schema::EVENTS_TABLE;
use analytics_core::{Error, Result};
use clickhouse::Client;
use std::future::Future;
use std::time::{Duration, Instant};
use telemetry::metrics;
use tracing::{error, info};

/// ClickHouse client wrapper.
///
/// The inner client is not bound to a database so the schema bootstrap can
/// create it; every statement uses qualified table names instead.
#[derive(Clone)]
pub struct ClickHouseClient {
    inner: Client,
    config: ClickHouseConfig,
    events_table: String,
}

impl ClickHouseClient {
    /// Creates a new ClickHouse client.
    pub fn new(config: ClickHouseConfig) -> Self {
        let mut client = Client::default()
            .with_url(&config.url)
            .with_option("max_execution_time", config.timeout_secs.to_string());

        if let Some(ref user) = config.username {
            client = client.with_user(user);
        }

        if let Some(ref pass) = config.password {
            client = client.with_password(pass);
        }

        info!(
            url = %config.url,
            database = %config.database,
            "Created ClickHouse client"
        );

        let events_table = format!("{}.{}", config.database, EVENTS_TABLE);

        Self {
            inner: client,
            config,
            events_table,
        }
    }

    /// Returns the inner clickhouse client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClickHouseConfig {
        &self.config
    }

    /// Fully qualified events table name.
    pub fn events_table(&self) -> &str {
        &self.events_table
    }

    /// Upper bound for a single round trip.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs.max(1))
    }
}

/// Runs one round trip under the configured timeout.
///
/// Driver errors and timeouts both surface as `DataSourceUnavailable`.
pub(crate) async fn run<T, F>(client: &ClickHouseClient, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, clickhouse::error::Error>>,
{
    let start = Instant::now();
    let outcome = tokio::time::timeout(client.timeout(), fut).await;
    metrics()
        .query_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            metrics().store_errors.inc();
            error!(error = %e, "ClickHouse query failed");
            Err(Error::data_source_unavailable(format!("ClickHouse error: {}", e)))
        }
        Err(_) => {
            metrics().store_errors.inc();
            error!(timeout_secs = client.config().timeout_secs, "ClickHouse query timed out");
            Err(Error::data_source_unavailable("ClickHouse query timed out"))
        }
    }
}
