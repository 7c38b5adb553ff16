//! Tests for the dashboard endpoints: auth, overview, charts, realtime.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use integration_tests::{fixtures, setup::TestContext};

fn auth() -> String {
    fixtures::bearer(&fixtures::user_token())
}

/// Missing token returns AUTH_001
#[tokio::test]
async fn test_missing_token_returns_401() {
    let ctx = TestContext::new().await;
    let response = ctx.server().get("/api/dashboard/overview").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "AUTH_001", "Expected AUTH_001 for missing token");
}

/// Malformed token returns AUTH_002
#[tokio::test]
async fn test_malformed_token_returns_401() {
    let ctx = TestContext::new().await;
    let response = ctx
        .server()
        .get("/api/dashboard/overview")
        .add_header("Authorization", "Bearer not-a-session-token")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "AUTH_002", "Expected AUTH_002 for malformed token");
}

#[tokio::test]
async fn test_overview_kpis_and_growth() {
    let ctx = TestContext::with_events(fixtures::dashboard_events(Utc::now())).await;
    let response = ctx
        .server()
        .get("/api/dashboard/overview")
        .add_header("Authorization", auth().as_str())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["kpis"]["totalRevenue"], 300.0);
    assert_eq!(body["kpis"]["totalUsers"], 40.0);
    assert_eq!(body["kpis"]["totalSales"], 12.0);
    assert_eq!(body["kpis"]["conversionRate"], 3.0);
    assert_eq!(body["growth"]["revenue"], 50.0);
    assert_eq!(body["growth"]["users"], -20.0);
    assert!(body["todayCount"].as_u64().unwrap() >= 1);
    assert!(body["lastUpdate"].is_string());
}

#[tokio::test]
async fn test_overview_empty_store_is_zeros() {
    let ctx = TestContext::new().await;
    let response = ctx
        .server()
        .get("/api/dashboard/overview")
        .add_header("Authorization", auth().as_str())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["kpis"]["conversionRate"], 0.0);
    assert_eq!(body["growth"]["revenue"], 0.0);
    assert_eq!(body["todayCount"], 0);
}

/// A store outage is a 503, never a zero-filled dashboard
#[tokio::test]
async fn test_store_outage_returns_503() {
    let ctx = TestContext::with_events(fixtures::dashboard_events(Utc::now())).await;
    ctx.set_store_failure(true);
    let server = ctx.server();

    for path in [
        "/api/dashboard/overview",
        "/api/dashboard/charts/revenue",
        "/api/dashboard/realtime",
        "/api/analytics/summary",
    ] {
        let response = server
            .get(path)
            .add_header("Authorization", auth().as_str())
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "DATA_001", "{} should report DATA_001", path);
        assert!(body.get("kpis").is_none());
    }
}

#[tokio::test]
async fn test_chart_is_dense_and_today_inclusive() {
    let now = Utc::now();
    let ctx = TestContext::with_events(vec![
        fixtures::event_days_ago(analytics_core::Metric::Sales, 100.0, "books", 2, now),
        fixtures::event_days_ago(analytics_core::Metric::Sales, 50.0, "books", 2, now),
        fixtures::event_days_ago(analytics_core::Metric::Sales, 30.0, "games", 0, now),
    ])
    .await;

    let response = ctx
        .server()
        .get("/api/dashboard/charts/sales")
        .add_query_param("days", "3")
        .add_header("Authorization", auth().as_str())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["metric"], "sales");
    assert_eq!(body["period"], "3 days");

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    let values: Vec<f64> = data.iter().map(|p| p["value"].as_f64().unwrap()).collect();
    assert_eq!(values, vec![150.0, 0.0, 30.0]);
    assert_eq!(body["total"], 180.0);

    let today = now.format("%Y-%m-%d").to_string();
    assert_eq!(data[2]["date"], today.as_str());
}

#[tokio::test]
async fn test_chart_category_filter() {
    let now = Utc::now();
    let ctx = TestContext::with_events(vec![
        fixtures::event_days_ago(analytics_core::Metric::Sales, 100.0, "books", 1, now),
        fixtures::event_days_ago(analytics_core::Metric::Sales, 30.0, "games", 1, now),
    ])
    .await;

    let response = ctx
        .server()
        .get("/api/dashboard/charts/sales")
        .add_query_param("days", "7")
        .add_query_param("category", "games")
        .add_header("Authorization", auth().as_str())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 30.0);
    assert_eq!(body["data"].as_array().unwrap().len(), 7);
}

/// Lenient mode zero-fills unknown metrics and coerces bad `days`
#[tokio::test]
async fn test_chart_lenient_defaults() {
    let ctx = TestContext::with_events(fixtures::dashboard_events(Utc::now())).await;
    let reads_before = ctx.store.read_count();

    let response = ctx
        .server()
        .get("/api/dashboard/charts/bounces")
        .add_query_param("days", "abc")
        .add_header("Authorization", auth().as_str())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["metric"], "bounces");
    assert_eq!(body["period"], "30 days");
    assert_eq!(body["data"].as_array().unwrap().len(), 30);
    assert_eq!(body["total"], 0.0);
    assert_eq!(ctx.store.read_count(), reads_before, "unknown metric must not hit the store");
}

#[tokio::test]
async fn test_chart_strict_mode_rejects() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .get("/api/dashboard/charts/bounces")
        .add_query_param("strict", "true")
        .add_header("Authorization", auth().as_str())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_002");

    let response = server
        .get("/api/dashboard/charts/sales")
        .add_query_param("strict", "true")
        .add_query_param("days", "0")
        .add_header("Authorization", auth().as_str())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

#[tokio::test]
async fn test_chart_all_metrics() {
    let ctx = TestContext::with_events(fixtures::dashboard_events(Utc::now())).await;
    let response = ctx
        .server()
        .get("/api/dashboard/charts/all")
        .add_query_param("days", "7")
        .add_header("Authorization", auth().as_str())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["metric"], "all");
    // revenue 100 + 200, users 40, sales 12, conversion 2 + 4
    assert_eq!(body["total"], 358.0);
}

#[tokio::test]
async fn test_realtime_returns_recent_and_publishes() {
    let now = Utc::now();
    let ctx = TestContext::with_events(vec![
        analytics_core::Event::new(
            analytics_core::Metric::Traffic,
            1.0,
            "organic",
            now - Duration::minutes(1),
        ),
        analytics_core::Event::new(
            analytics_core::Metric::Traffic,
            2.0,
            "organic",
            now - Duration::minutes(3),
        ),
        analytics_core::Event::new(
            analytics_core::Metric::Traffic,
            5.0,
            "organic",
            now - Duration::minutes(30),
        ),
    ])
    .await;
    let mut updates = ctx.feed.subscribe();

    let response = ctx
        .server()
        .get("/api/dashboard/realtime")
        .add_header("Authorization", auth().as_str())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 2);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data[0]["value"], 1.0, "newest first");
    assert_eq!(data[1]["value"], 2.0);

    match updates.try_recv().unwrap() {
        analytics_core::RealtimeUpdate::Recent { recent } => assert_eq!(recent.count, 2),
        other => panic!("unexpected update: {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_query_token_receives_new_metric() {
    let ctx = TestContext::new().await;
    let server = ctx.http_server();

    let mut socket = server
        .get_websocket("/api/dashboard/stream")
        .add_query_param("token", fixtures::user_token())
        .await
        .into_websocket()
        .await;
    ctx.wait_for_subscribers(1).await;

    server
        .post("/api/analytics")
        .add_header("Authorization", fixtures::bearer(&fixtures::admin_token()).as_str())
        .json(&fixtures::new_metric_body("sales", 7.0, "books"))
        .await
        .assert_status(StatusCode::CREATED);

    let update: serde_json::Value = socket.receive_json().await;
    assert_eq!(update["type"], "new_metric");
    assert_eq!(update["metric"], "sales");
    assert_eq!(update["value"], 7.0);
    assert_eq!(update["category"], "books");

    socket.close().await;
}

#[tokio::test]
async fn test_stream_header_token_receives_recent() {
    let ctx = TestContext::with_events(vec![analytics_core::Event::new(
        analytics_core::Metric::Traffic,
        4.0,
        "organic",
        Utc::now() - Duration::minutes(1),
    )])
    .await;
    let server = ctx.http_server();

    let mut socket = server
        .get_websocket("/api/dashboard/stream")
        .add_header("Authorization", auth().as_str())
        .await
        .into_websocket()
        .await;
    ctx.wait_for_subscribers(1).await;

    server
        .get("/api/dashboard/realtime")
        .add_header("Authorization", auth().as_str())
        .await
        .assert_status_ok();

    let update: serde_json::Value = socket.receive_json().await;
    assert_eq!(update["type"], "recent");
    assert_eq!(update["recent"]["count"], 1);

    socket.close().await;
}

#[tokio::test]
async fn test_stream_rejects_bad_tokens() {
    let ctx = TestContext::new().await;
    let server = ctx.http_server();

    let response = server
        .get_websocket("/api/dashboard/stream")
        .add_query_param("token", "not-a-session-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "AUTH_002");

    let response = server.get_websocket("/api/dashboard/stream").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "AUTH_001");

    assert_eq!(ctx.feed.subscriber_count(), 0);
}
