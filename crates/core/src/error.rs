//! Unified error types for the analytics service.
//!
//! Error codes:
//! - AUTH_001-004: Authentication / authorization errors
//! - VALID_001-003: Parameter and body validation errors
//! - DATA_001: Event store unavailable
//!
//! `RATE_001` is produced by the HTTP layer only.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Authentication error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// AUTH_001: Session token is required
    MissingToken,
    /// AUTH_002: Malformed session token
    InvalidFormat,
    /// AUTH_003: Token rejected by the auth service
    InvalidToken,
    /// AUTH_004: Caller role does not allow the operation
    Forbidden,
}

impl AuthErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "AUTH_001",
            Self::InvalidFormat => "AUTH_002",
            Self::InvalidToken => "AUTH_003",
            Self::Forbidden => "AUTH_004",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingToken | Self::InvalidFormat | Self::InvalidToken => 401,
            Self::Forbidden => 403,
        }
    }
}

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Invalid query parameter (days, page, dates)
    InvalidParameter,
    /// VALID_002: Metric identifier is not recognized
    UnknownMetric,
    /// VALID_003: Request body failed validation
    InvalidBody,
}

impl ValidationErrorCode {
    pub const HTTP_STATUS: u16 = 400;

    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "VALID_001",
            Self::UnknownMetric => "VALID_002",
            Self::InvalidBody => "VALID_003",
        }
    }
}

/// Data source error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorCode {
    /// DATA_001: The event store could not be queried
    SourceUnavailable,
}

impl DataErrorCode {
    pub const HTTP_STATUS: u16 = 503;

    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SourceUnavailable => "DATA_001",
        }
    }
}

/// Unified error type for the analytics service.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication error with code.
    #[error("[{code}] {message}")]
    Auth {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Rejected parameter or body. Always a 400.
    #[error("[{code}] {message}")]
    InvalidParameter { code: &'static str, message: String },

    /// The event store read or write failed. Never converted into an empty result.
    #[error("[{code}] {message}")]
    DataSourceUnavailable { code: &'static str, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an authentication error.
    pub fn auth(code: AuthErrorCode, msg: impl Into<String>) -> Self {
        Self::Auth {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a parameter validation error.
    pub fn invalid_parameter(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::InvalidParameter {
            code: code.code(),
            message: msg.into(),
        }
    }

    /// Create a data source error.
    pub fn data_source_unavailable(msg: impl Into<String>) -> Self {
        Self::DataSourceUnavailable {
            code: DataErrorCode::SourceUnavailable.code(),
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error came from the event store rather than the caller.
    pub fn is_data_source_unavailable(&self) -> bool {
        matches!(self, Self::DataSourceUnavailable { .. })
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Auth { http_status, .. } => *http_status,
            Self::InvalidParameter { .. } => ValidationErrorCode::HTTP_STATUS,
            Self::DataSourceUnavailable { .. } => DataErrorCode::HTTP_STATUS,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Auth { code, .. }
            | Self::InvalidParameter { code, .. }
            | Self::DataSourceUnavailable { code, .. } => Some(code),
            Self::NotFound(_) | Self::Internal(_) => None,
        }
    }
}
