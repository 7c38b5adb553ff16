//! ClickHouse-backed store against a real server.
//!
//! Needs Docker, or `DASHBOARD_TEST_CLICKHOUSE_URL` pointing at a running
//! server. Run with `cargo test -p integration-tests -- --ignored`.

use analytics_core::{
    DateWindow, Event, EventFilter, EventSource, EventStore, ListQuery, Metric, SortField,
    SortOrder,
};
use chrono::{Duration, DurationRound, Utc};
use clickhouse_client::{health, ClickHouseClient, ClickHouseConfig, ClickHouseStore};
use integration_tests::containers::ClickHouseServer;

async fn store(server: &ClickHouseServer) -> ClickHouseStore {
    let client = ClickHouseClient::new(server.config.clone());
    health::init_schema(&client)
        .await
        .expect("Failed to init schema");
    clickhouse_client::insert::truncate_events(&client)
        .await
        .expect("Failed to truncate events");

    ClickHouseStore::new(client)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_clickhouse_round_trip() {
    let server = ClickHouseServer::start().await;
    let store = store(&server).await;
    assert!(store.ping().await.is_ok());

    // Stored with millisecond precision
    let now = Utc::now()
        .duration_trunc(Duration::milliseconds(1))
        .unwrap();
    let mut revenue = Event::new(Metric::Revenue, 120.25, "store", now - Duration::days(1));
    revenue
        .metadata
        .insert("campaign".into(), serde_json::json!("spring"));
    let sales = Event::new(Metric::Sales, 3.0, "books", now - Duration::days(2));
    let old = Event::new(Metric::Revenue, 9.0, "store", now - Duration::days(90));

    for event in [&revenue, &sales, &old] {
        store.insert(event.clone()).await.unwrap();
    }

    let window = DateWindow::new(now - Duration::days(30), now);
    let fetched = store
        .fetch_events(&EventFilter::new(window).with_metric(Some(Metric::Revenue)))
        .await
        .unwrap();
    assert_eq!(fetched, vec![revenue.clone()]);

    let page = store
        .list(&ListQuery {
            sort_by: SortField::Value,
            sort_order: SortOrder::Asc,
            limit: 2,
            ..ListQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, sales.id);

    let removed = store.delete(revenue.id).await.unwrap();
    assert_eq!(removed.map(|e| e.id), Some(revenue.id));
    assert!(store.delete(revenue.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    let config = ClickHouseConfig::default().with_url("http://127.0.0.1:1");
    let store = ClickHouseStore::new(ClickHouseClient::new(config));

    let window = DateWindow::new(Utc::now() - Duration::days(1), Utc::now());
    let err = store
        .fetch_events(&EventFilter::new(window))
        .await
        .unwrap_err();
    assert!(err.is_data_source_unavailable());
    assert!(store.ping().await.is_err());
}
