//! Test fixtures and event generators.

use analytics_core::{Event, Metric};
use chrono::{DateTime, Duration, Utc};

/// Session token that mock auth treats as an admin.
pub fn admin_token() -> String {
    "dsh_adm_ABC123xyz789DEF456ghi012JKL345mn".to_string()
}

/// Session token that mock auth treats as a regular user.
pub fn user_token() -> String {
    "dsh_usr_ABC123xyz789DEF456ghi012JKL345mn".to_string()
}

/// `Authorization` header value for a token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// An event `days` days before `now`, at the same time of day.
pub fn event_days_ago(
    metric: Metric,
    value: f64,
    category: &str,
    days: i64,
    now: DateTime<Utc>,
) -> Event {
    Event::new(metric, value, category, now - Duration::days(days))
}

/// A spread of events over the current and previous 30-day windows.
///
/// Current window: revenue 300, users 40, sales 12, conversion avg 3.
/// Previous window: revenue 200, users 50.
pub fn dashboard_events(now: DateTime<Utc>) -> Vec<Event> {
    vec![
        Event::new(Metric::Revenue, 100.0, "store", now - Duration::minutes(2)),
        event_days_ago(Metric::Revenue, 200.0, "store", 3, now),
        event_days_ago(Metric::Users, 40.0, "web", 2, now),
        event_days_ago(Metric::Sales, 12.0, "electronics", 1, now),
        event_days_ago(Metric::Conversion, 2.0, "web", 4, now),
        event_days_ago(Metric::Conversion, 4.0, "web", 5, now),
        event_days_ago(Metric::Revenue, 200.0, "store", 40, now),
        event_days_ago(Metric::Users, 50.0, "web", 45, now),
    ]
}

/// Create-metric request body.
pub fn new_metric_body(metric: &str, value: f64, category: &str) -> serde_json::Value {
    serde_json::json!({
        "metric": metric,
        "value": value,
        "category": category,
        "metadata": { "note": "integration test" }
    })
}
