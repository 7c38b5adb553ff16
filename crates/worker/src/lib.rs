//! Background workers for the dashboard analytics service.
//!
//! - Realtime poll (overview and recent events pushed to stream subscribers)
//! - Store health probe (drives readiness)
//! - Metrics log

pub mod realtime;
pub mod scheduler;
pub mod store_health;

pub use realtime::RealtimeWorker;
pub use scheduler::*;
pub use store_health::StoreHealthWorker;
