//! Dashboard Analytics Service
//!
//! Serves business metrics for an analytics dashboard:
//! - KPI overview with period-over-period growth
//! - Dense per-day charts and grouped summaries
//! - Event management for admins
//! - Realtime updates over WebSocket

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::{error, info, warn};

use analytics_core::{EventSource, EventStore, MemoryStore, RealtimeFeed, DEFAULT_FEED_CAPACITY};
use api::{router, AppState, RateLimitConfig, RouterConfig};
use clickhouse_client::{ClickHouseClient, ClickHouseConfig, ClickHouseStore};
use telemetry::{health, init_tracing, TracingConfig};
use worker::{StoreHealthWorker, WorkerConfig, WorkerScheduler};

/// Where events live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoreBackend {
    Clickhouse,
    /// Process-local, lost on restart. Development only.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreConfig {
    backend: StoreBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Clickhouse,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct RealtimeConfig {
    poll_interval_secs: u64,
    channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 300,
            channel_capacity: DEFAULT_FEED_CAPACITY,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Auth service URL for session verification (`mock` for development)
    #[serde(default = "default_auth_url")]
    auth_url: String,

    /// Dashboard origin allowed by CORS
    #[serde(default)]
    client_url: Option<String>,

    #[serde(default)]
    log: TracingConfig,

    #[serde(default)]
    store: StoreConfig,

    #[serde(default)]
    clickhouse: ClickHouseConfig,

    #[serde(default)]
    realtime: RealtimeConfig,

    #[serde(default)]
    rate_limit: RateLimitConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_auth_url() -> String {
    "http://auth-service:8080".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth_url: default_auth_url(),
            client_url: None,
            log: TracingConfig::default(),
            store: StoreConfig::default(),
            clickhouse: ClickHouseConfig::default(),
            realtime: RealtimeConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = load_config()?;

    init_tracing(&config.log);

    info!("Starting Dashboard Analytics v{}", env!("CARGO_PKG_VERSION"));

    let feed = RealtimeFeed::new(config.realtime.channel_capacity);

    let (state, source) = match config.store.backend {
        StoreBackend::Clickhouse => {
            let client = ClickHouseClient::new(config.clickhouse.clone());

            if let Err(e) = clickhouse_client::health::init_schema(&client).await {
                error!("Failed to initialize ClickHouse schema: {}", e);
                // Continue anyway - the health worker reports the outage
            }

            build_state(Arc::new(ClickHouseStore::new(client)), &config, feed.clone())
        }
        StoreBackend::Memory => {
            warn!("Using in-memory event store; events are lost on restart");
            build_state(Arc::new(MemoryStore::new()), &config, feed.clone())
        }
    };

    // Check health before accepting traffic
    if StoreHealthWorker::new(source.clone()).check().await {
        info!(backend = ?config.store.backend, "Event store: healthy");
    } else {
        error!(backend = ?config.store.backend, "Event store: unhealthy");
    }
    if state.auth_client.is_mock() {
        warn!("Auth service in mock mode; any well-formed session token is accepted");
        health().auth.set_healthy();
    }

    let worker_config = WorkerConfig {
        realtime_poll_interval: Duration::from_secs(config.realtime.poll_interval_secs.max(1)),
        ..WorkerConfig::default()
    };
    let worker_scheduler = Arc::new(WorkerScheduler::new(worker_config, source, feed));
    let _worker_handles = worker_scheduler.start();

    let _rate_limiter_cleanup = state.start_rate_limiter_cleanup();
    info!("Started rate limiter cleanup task (every 5 minutes)");

    let app = router(
        state,
        RouterConfig {
            client_url: config.client_url.clone(),
        },
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Application state plus the read side handed to background workers.
fn build_state<S>(
    store: Arc<S>,
    config: &Config,
    feed: RealtimeFeed,
) -> (AppState, Arc<dyn EventSource>)
where
    S: EventStore + 'static,
{
    let source: Arc<dyn EventSource> = store.clone();
    let state = AppState::new(store, &config.auth_url, feed)
        .with_rate_limit(config.rate_limit.clone());
    (state, source)
}

/// Load configuration from files and environment.
///
/// Environment keys look like `DASHBOARD_PORT` or `DASHBOARD_CLICKHOUSE__URL`.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Deployment platforms commonly inject these flat names
    if let Ok(url) = std::env::var("DASHBOARD_CLICKHOUSE_URL") {
        config.clickhouse.url = url;
    }
    if let Ok(password) = std::env::var("DASHBOARD_CLICKHOUSE_PASSWORD") {
        config.clickhouse.password = Some(password);
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
