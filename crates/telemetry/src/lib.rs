//! Telemetry for the dashboard analytics service: structured logging setup,
//! a global health registry and in-process metrics.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
