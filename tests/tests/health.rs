//! Tests for health check endpoints.

use analytics_core::EventSource;
use axum::http::StatusCode;
use integration_tests::{fixtures, setup::TestContext};
use std::sync::Arc;
use worker::StoreHealthWorker;

/// Test /api/health returns the report and a metrics snapshot
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();

    assert!(body.get("status").is_some(), "Response should have 'status' field");
    assert!(
        body.get("store_connected").is_some(),
        "Response should have 'store_connected' field"
    );
    assert!(body["report"]["components"].is_array());
    assert!(body["metrics"]["ws_clients"].is_u64());

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "degraded" || status == "unhealthy",
        "Status should be 'healthy', 'degraded', or 'unhealthy', got '{}'",
        status
    );
}

/// Readiness follows the store probe
#[tokio::test]
async fn test_ready_after_store_probe() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let source: Arc<dyn EventSource> = ctx.store.clone();
    assert!(StoreHealthWorker::new(source).check().await);

    server.get("/health/ready").await.assert_status_ok();
    let body: serde_json::Value = server.get("/api/health").await.json();
    assert_eq!(body["store_connected"], true);
}

/// Test /health/live endpoint always returns 200 when service is running
#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::new().await;
    ctx.server().get("/health/live").await.assert_status_ok();
}

/// Health endpoints skip auth and rate limiting
#[tokio::test]
async fn test_health_endpoints_no_auth_required() {
    let ctx = TestContext::with_rate_limit(api::RateLimitConfig { rate: 0, burst: 1 }).await;
    let server = ctx.server();

    for _ in 0..3 {
        let response = server.get("/api/health").await;
        assert_ne!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_ne!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    // Protected routes are limited
    let token = fixtures::bearer(&fixtures::user_token());
    server
        .get("/api/dashboard/overview")
        .add_header("Authorization", token.as_str())
        .await
        .assert_status_ok();
    let response = server
        .get("/api/dashboard/overview")
        .add_header("Authorization", token.as_str())
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("Retry-After"), "60");
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "RATE_001");
}
