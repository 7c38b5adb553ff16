//! Core types, windowing and metrics aggregation for the dashboard analytics
//! service.
//!
//! Aggregation is recomputed on every request from raw events; nothing here
//! caches or persists derived values.

pub mod aggregate;
pub mod auth;
pub mod error;
pub mod events;
pub mod feed;
pub mod growth;
pub mod limits;
pub mod memory;
pub mod metric;
pub mod params;
pub mod report;
pub mod series;
pub mod service;
pub mod store;
pub mod window;

pub use aggregate::*;
pub use auth::*;
pub use error::{AuthErrorCode, Error, Result, ValidationErrorCode};
pub use events::*;
pub use feed::*;
pub use growth::compute_growth;
pub use memory::MemoryStore;
pub use metric::*;
pub use params::DaysBack;
pub use report::*;
pub use series::*;
pub use service::Aggregator;
pub use store::*;
pub use window::*;
