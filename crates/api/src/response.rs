//! Standardized API responses.

use analytics_core::{Event, Page};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use telemetry::{HealthReport, MetricsSnapshot};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_connected: bool,
    pub report: HealthReport,
    pub metrics: MetricsSnapshot,
}

/// Pagination block of a listing.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u32,
}

/// Listing response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<Event>,
    pub pagination: Pagination,
}

impl From<Page<Event>> for ListResponse {
    fn from(page: Page<Event>) -> Self {
        let pagination = Pagination {
            current_page: page.page,
            total_pages: page.total_pages(),
            total_items: page.total,
            items_per_page: page.limit,
        };
        Self {
            data: page.items,
            pagination,
        }
    }
}

/// Response to a create or delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> MessageResponse<T> {
    pub fn new(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error with a stable code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
            retry_after: None,
        }
    }

    pub fn bad_request(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, code, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "NOT_FOUND", msg)
    }

    pub fn rate_limited(msg: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            response: ErrorResponse::new(msg, "RATE_001"),
            retry_after,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", msg)
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.response = self.response.with_details(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(retry_after) = self.retry_after {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
        }

        response
    }
}

impl From<analytics_core::Error> for ApiError {
    fn from(err: analytics_core::Error) -> Self {
        use analytics_core::Error;

        match err {
            Error::Auth {
                code,
                message,
                http_status,
            } => {
                let status = StatusCode::from_u16(http_status).unwrap_or(StatusCode::UNAUTHORIZED);
                ApiError::with_code(status, code, message)
            }
            Error::InvalidParameter { code, message, .. } => ApiError::bad_request(code, message),
            Error::DataSourceUnavailable { code, message, .. } => {
                tracing::error!(error = %message, "Data source unavailable");
                ApiError::with_code(
                    StatusCode::SERVICE_UNAVAILABLE,
                    code,
                    "Data source temporarily unavailable",
                )
            }
            Error::NotFound(msg) => ApiError::not_found(msg),
            Error::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ApiError::internal("Internal server error")
            }
        }
    }
}
