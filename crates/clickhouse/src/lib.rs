//! ClickHouse storage for dashboard events.

pub mod client;
pub mod config;
pub mod health;
pub mod insert;
pub mod query;
pub mod schema;
pub mod store;

pub use client::ClickHouseClient;
pub use config::*;
pub use store::ClickHouseStore;
