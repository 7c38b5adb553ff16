//! Session token format checks and auth service types.
//!
//! Token issuance and verification belong to the external auth service; this
//! module only checks the token shape and models the verified caller.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{AuthErrorCode, Error, Result};
use crate::limits::SESSION_TOKEN_PATTERN;

/// Compiled session token regex (lazy initialization).
static SESSION_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SESSION_TOKEN_PATTERN).expect("invalid session token pattern"));

/// Caller role as reported by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Bearer token that passed the format check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    raw: String,
}

impl SessionToken {
    /// Format: `dsh_[A-Za-z0-9_-]{32,128}`
    pub fn parse(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::auth(
                AuthErrorCode::MissingToken,
                "Session token is required",
            ));
        }

        if !SESSION_TOKEN_REGEX.is_match(token) {
            return Err(Error::auth(
                AuthErrorCode::InvalidFormat,
                "Invalid session token format",
            ));
        }

        Ok(Self {
            raw: token.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    /// Fails with `AUTH_004` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(Error::auth(
                AuthErrorCode::Forbidden,
                "Admin role required",
            ))
        }
    }
}

/// Request to the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub token: String,
}

impl VerifyRequest {
    pub fn new(token: &SessionToken) -> Self {
        Self {
            token: token.as_str().to_string(),
        }
    }
}

/// Auth service verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_id: Option<String>,
    pub role: Option<Role>,
    pub error: Option<VerifyResponseError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponseError {
    pub code: String,
    pub message: String,
}

impl VerifyResponse {
    /// Converts the verdict into a caller identity.
    pub fn identity(&self) -> Result<Identity> {
        if !self.valid {
            let msg = self
                .error
                .as_ref()
                .map(|e| e.message.as_str())
                .unwrap_or("Invalid session token");
            return Err(Error::auth(AuthErrorCode::InvalidToken, msg));
        }

        let user_id = self.user_id.clone().ok_or_else(|| {
            Error::auth(AuthErrorCode::InvalidToken, "Missing user ID in response")
        })?;

        Ok(Identity {
            user_id,
            role: self.role.unwrap_or_default(),
        })
    }
}

/// Extract the session token from an `Authorization: Bearer <token>` header.
pub fn extract_session_token(auth_header: Option<&str>) -> Result<SessionToken> {
    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => SessionToken::parse(token.trim()),
        None => Err(Error::auth(
            AuthErrorCode::MissingToken,
            "Session token is required",
        )),
    }
}
