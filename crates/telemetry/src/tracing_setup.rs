//! Structured logging setup.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Default directives: service crates at `info`, request spans from
/// tower-http only on failure.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=warn";

/// The `log` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// `EnvFilter` directives, e.g. `info,clickhouse_client=debug`
    pub filter: String,
    /// One JSON object per line instead of the human-readable format
    pub json: bool,
    /// Log span open and close
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// `RUST_LOG` wins over the configured directives. Unparseable
    /// directives fall back to the default.
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(config: &TracingConfig) {
    // Exactly one of the two formatters is installed.
    let json_layer = config.json.then(|| {
        fmt::layer()
            .json()
            .with_span_events(config.fmt_span())
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });
    let pretty_layer = (!config.json).then(|| {
        fmt::layer()
            .with_span_events(config.fmt_span())
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(filter = %config.filter, json = config.json, "Logging initialized");
}
