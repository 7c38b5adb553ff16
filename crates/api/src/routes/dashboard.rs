//! Dashboard endpoints: overview, charts, realtime and the update stream.

use analytics_core::{
    extract_session_token, params::parse_flag, ChartResult, DaysBack, MetricSelector,
    OverviewResult, RealtimeSnapshot, RealtimeUpdate, SessionToken,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{header, HeaderMap},
    response::Response,
    Json,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use telemetry::metrics;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::extractors::AuthContext;
use crate::response::ApiError;
use crate::state::AppState;

/// GET /api/dashboard/overview
pub async fn overview_handler(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<OverviewResult>, ApiError> {
    metrics().overview_requests.inc();
    let overview = state.aggregator.overview(Utc::now()).await?;
    Ok(Json(overview))
}

/// Chart query string. Everything is parsed by hand so the lenient mode can
/// fall back instead of rejecting.
#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    pub days: Option<String>,
    pub category: Option<String>,
    pub strict: Option<String>,
}

/// GET /api/dashboard/charts/:metric
pub async fn chart_handler(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(metric): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<Json<ChartResult>, ApiError> {
    metrics().chart_requests.inc();

    let (selector, days_back) = if parse_flag(params.strict.as_deref()) {
        (
            MetricSelector::strict(&metric)?,
            DaysBack::strict(params.days.as_deref())?,
        )
    } else {
        (
            MetricSelector::lenient(&metric),
            DaysBack::lenient(params.days.as_deref()),
        )
    };

    let category = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    debug!(metric = %selector.label(), days_back = days_back.get(), ?category, "Chart request");

    let chart = state
        .aggregator
        .chart(&selector, days_back, category, Utc::now())
        .await?;
    Ok(Json(chart))
}

/// GET /api/dashboard/realtime
///
/// The snapshot is also pushed to stream subscribers.
pub async fn realtime_handler(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<RealtimeSnapshot>, ApiError> {
    metrics().realtime_requests.inc();

    let snapshot = state.aggregator.realtime(Utc::now()).await?;
    state.feed.publish(RealtimeUpdate::Recent {
        recent: snapshot.clone(),
    });

    Ok(Json(snapshot))
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    /// Browsers cannot set headers on a WebSocket handshake.
    pub token: Option<String>,
}

/// GET /api/dashboard/stream
pub async fn stream_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<StreamParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match (auth_header, params.token.as_deref()) {
        (Some(_), _) | (None, None) => extract_session_token(auth_header)?,
        (None, Some(raw)) => SessionToken::parse(raw)?,
    };
    let identity = state.auth_client.verify(&token).await?;

    info!(user_id = %identity.user_id, "Dashboard stream connected");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

/// Forward feed updates until either side goes away. Client messages are ignored.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut updates = state.feed.subscribe();
    let (mut sender, mut receiver) = socket.split();
    metrics().ws_clients.inc();

    let mut send_task = tokio::spawn(async move {
        loop {
            let update = match updates.recv().await {
                Ok(update) => update,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Stream subscriber lagging, dropped updates");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let json = match serde_json::to_string(&update) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize realtime update");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    metrics().ws_clients.dec();
    debug!("Dashboard stream disconnected");
}
