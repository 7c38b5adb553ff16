//! Application state shared across handlers.

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};
use analytics_core::{
    Aggregator, Error, EventSource, EventStore, Identity, RealtimeFeed, Role, SessionToken,
    VerifyRequest, VerifyResponse,
};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use telemetry::health;
use tracing::{debug, warn};

/// Cache TTL for verified sessions (30 seconds).
const AUTH_CACHE_TTL: Duration = Duration::from_secs(30);

/// Maximum cache entries.
const AUTH_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Tokens with this prefix are admins in mock mode.
const MOCK_ADMIN_PREFIX: &str = "dsh_adm";

/// Auth service client.
///
/// Calls the auth service's `/internal/auth/verify` endpoint and caches
/// successful verifications for 30 seconds.
#[derive(Clone)]
pub struct AuthClient {
    /// Auth service URL (e.g., "http://auth-service:8080")
    base_url: String,
    http_client: reqwest::Client,
    /// Session token -> verified identity
    cache: Cache<String, Identity>,
    /// Accept any well-formed token (development and tests)
    mock_mode: bool,
}

impl AuthClient {
    /// Creates a new auth client. An empty URL or `mock` enables mock mode.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let mock_mode = base_url.is_empty() || base_url == "mock";

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            base_url,
            http_client,
            cache: Cache::builder()
                .max_capacity(AUTH_CACHE_MAX_CAPACITY)
                .time_to_live(AUTH_CACHE_TTL)
                .build(),
            mock_mode,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.mock_mode
    }

    /// Verify a session token.
    ///
    /// Returns the cached identity if available, otherwise calls the auth service.
    pub async fn verify(&self, token: &SessionToken) -> Result<Identity, Error> {
        let cache_key = token.as_str().to_string();

        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!("Auth cache hit");
            return Ok(cached);
        }

        let identity = if self.mock_mode {
            mock_identity(token)
        } else {
            self.remote_verify(token).await?.identity()?
        };

        self.cache.insert(cache_key, identity.clone()).await;

        Ok(identity)
    }

    async fn remote_verify(&self, token: &SessionToken) -> Result<VerifyResponse, Error> {
        let url = format!("{}/internal/auth/verify", self.base_url);

        debug!(url = %url, "Calling auth service");

        let response = self
            .http_client
            .post(&url)
            .json(&VerifyRequest::new(token))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Auth service request failed");
                health().auth.set_unhealthy(e.to_string());
                Error::internal(format!("Auth service unavailable: {}", e))
            })?;

        health().auth.set_healthy();

        // A rejected token still comes back as a verdict body.
        if response.status().is_server_error() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Auth service returned error");
            return Err(Error::internal(format!(
                "Auth service returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse auth response");
            Error::internal(format!("Invalid auth response: {}", e))
        })
    }
}

fn mock_identity(token: &SessionToken) -> Identity {
    debug!("Using mock auth verification");
    let role = if token.as_str().starts_with(MOCK_ADMIN_PREFIX) {
        Role::Admin
    } else {
        Role::User
    };
    Identity {
        user_id: format!("mock-{}", &token.as_str()[4..12]),
        role,
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Read-only aggregation over the store
    pub aggregator: Aggregator,
    /// Event store (ClickHouse in production, in-memory in development and tests)
    pub store: Arc<dyn EventStore>,
    /// Auth service client
    pub auth_client: AuthClient,
    /// Rate limiter
    pub rate_limiter: SharedRateLimiter,
    /// Realtime updates for WebSocket subscribers
    pub feed: RealtimeFeed,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, auth_url: impl Into<String>, feed: RealtimeFeed) -> Self
    where
        S: EventStore + 'static,
    {
        let source: Arc<dyn EventSource> = store.clone();
        Self {
            aggregator: Aggregator::new(source),
            store,
            auth_client: AuthClient::new(auth_url),
            rate_limiter: Arc::new(RateLimiter::new(RateLimitConfig::default())),
            feed,
        }
    }

    /// Replace the default rate limit.
    pub fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limiter = Arc::new(RateLimiter::new(config));
        self
    }

    /// Start the rate limiter cleanup background task.
    /// Returns a handle that can be used to cancel the task.
    pub fn start_rate_limiter_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let rate_limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300)); // 5 minutes
            loop {
                interval.tick().await;
                rate_limiter.cleanup(Duration::from_secs(600));
            }
        })
    }
}
