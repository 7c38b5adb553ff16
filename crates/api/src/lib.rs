//! HTTP and WebSocket API for the dashboard analytics service.

pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use middleware::rate_limit::RateLimitConfig;
pub use routes::{router, RouterConfig};
pub use state::{AppState, AuthClient};
