//! API routes.

pub mod analytics;
pub mod dashboard;
pub mod health;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    map_response_body::MapResponseBodyLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::middleware::rate_limit::rate_limit;
use crate::state::AppState;

/// Router options that come from configuration rather than state.
#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    /// Allowed CORS origin. Any origin when unset.
    pub client_url: Option<String>,
}

fn cors_layer(config: &RouterConfig) -> CorsLayer {
    let origin = match config.client_url.as_deref() {
        Some(url) => match HeaderValue::from_str(url) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                warn!(client_url = %url, error = %e, "Invalid CORS origin, allowing any");
                AllowOrigin::any()
            }
        },
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the API router.
pub fn router(state: AppState, config: RouterConfig) -> Router {
    let api = Router::new()
        .route("/api/dashboard/overview", get(dashboard::overview_handler))
        .route("/api/dashboard/charts/:metric", get(dashboard::chart_handler))
        .route("/api/dashboard/realtime", get(dashboard::realtime_handler))
        .route("/api/dashboard/stream", get(dashboard::stream_handler))
        .route(
            "/api/analytics",
            get(analytics::list_handler).post(analytics::create_handler),
        )
        .route("/api/analytics/summary", get(analytics::summary_handler))
        .route("/api/analytics/:id", delete(analytics::delete_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .merge(api)
        // Outermost first: CORS answers preflights before tracing and compression.
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config))
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
