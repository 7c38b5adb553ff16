//! Event management endpoints and the grouped summary.

use analytics_core::{
    DaysBack, Error, Event, ListQuery, MetricSelector, NewEvent, RealtimeUpdate,
    SortField, SortOrder, SummaryResult, ValidationErrorCode, SOURCE_MANUAL,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use telemetry::metrics;
use tracing::{debug, info};
use uuid::Uuid;

use crate::extractors::{AdminContext, AuthContext};
use crate::response::{ApiError, ListResponse, MessageResponse};
use crate::state::AppState;

/// Listing query string, camelCase as sent by the dashboard client.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub metric: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListParams {
    /// Paging and sort fall back to defaults; filters must be valid.
    pub fn into_query(self) -> Result<ListQuery, Error> {
        let defaults = ListQuery::default();

        let metric = match non_empty(self.metric.as_deref()) {
            None => None,
            Some(raw) => MetricSelector::strict(raw)?.metric(),
        };

        let start = non_empty(self.start_date.as_deref())
            .map(|raw| parse_date_param("startDate", raw, false))
            .transpose()?;
        let end = non_empty(self.end_date.as_deref())
            .map(|raw| parse_date_param("endDate", raw, true))
            .transpose()?;

        Ok(ListQuery {
            metric,
            category: non_empty(self.category.as_deref()).map(str::to_string),
            start,
            end,
            page: parse_or(self.page.as_deref(), defaults.page),
            limit: parse_or(self.limit.as_deref(), defaults.limit),
            sort_by: self
                .sort_by
                .as_deref()
                .map_or(defaults.sort_by, SortField::parse_lenient),
            sort_order: self
                .sort_order
                .as_deref()
                .map_or(defaults.sort_order, SortOrder::parse_lenient),
        }
        .normalized())
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_or(raw: Option<&str>, default: u32) -> u32 {
    non_empty(raw).and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// RFC 3339 instant or `YYYY-MM-DD`. A bare end date covers its whole UTC day.
fn parse_date_param(name: &str, raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, Error> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        Error::invalid_parameter(
            ValidationErrorCode::InvalidParameter,
            format!("{} must be YYYY-MM-DD or RFC 3339, got '{}'", name, raw),
        )
    })?;

    let start = day.and_time(NaiveTime::MIN).and_utc();
    Ok(if end_of_day {
        start + Duration::days(1) - Duration::milliseconds(1)
    } else {
        start
    })
}

/// GET /api/analytics
pub async fn list_handler(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    metrics().list_requests.inc();

    let query = params.into_query()?;
    debug!(page = query.page, limit = query.limit, "Listing events");

    let page = state.store.list(&query).await?;
    Ok(Json(ListResponse::from(page)))
}

/// POST /api/analytics
///
/// Admin only. The event is stamped with the `manual` source and the current
/// time, then announced on the realtime feed.
pub async fn create_handler(
    State(state): State<AppState>,
    AdminContext(auth): AdminContext,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse<Event>>), ApiError> {
    let new_event: NewEvent = serde_json::from_slice(&body).map_err(|e| {
        Error::invalid_parameter(ValidationErrorCode::InvalidBody, e.to_string())
    })?;
    let event = new_event.into_event(SOURCE_MANUAL, Utc::now())?;

    state.store.insert(event.clone()).await?;
    metrics().events_created.inc();

    state.feed.publish(RealtimeUpdate::new_metric(&event));
    metrics().realtime_broadcasts.inc();

    info!(
        id = %event.id,
        metric = %event.metric,
        user_id = %auth.identity.user_id,
        "Metric created"
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Metric created", Some(event))),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub days: Option<String>,
}

/// GET /api/analytics/summary
pub async fn summary_handler(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResult>, ApiError> {
    metrics().summary_requests.inc();

    let days_back = DaysBack::lenient(params.days.as_deref());
    let summary = state.aggregator.summary(days_back, Utc::now()).await?;
    Ok(Json(summary))
}

/// DELETE /api/analytics/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    AdminContext(auth): AdminContext,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse<Event>>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::not_found("Metric not found"))?;

    let removed = state
        .store
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Metric not found"))?;
    metrics().events_deleted.inc();

    info!(%id, metric = %removed.metric, user_id = %auth.identity.user_id, "Metric deleted");
    Ok(Json(MessageResponse::new("Metric deleted", None)))
}
