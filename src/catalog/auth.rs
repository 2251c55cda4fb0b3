//! Client-credentials token exchange.
//!
//! The catalog only needs app-level access, so we trade the client ID and
//! secret for a bearer token and keep it for as long as it is valid. The
//! cache lives inside the client instance; nothing is stored on disk.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::domain::{CatalogConfig, CatalogError};
use super::dto;

/// Refresh tokens this long before they actually expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + EXPIRY_MARGIN < self.expires_at
    }
}

/// Per-client bearer token cache.
#[derive(Debug, Default)]
pub struct TokenCache {
    token: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a valid bearer token, exchanging credentials if needed.
    ///
    /// Concurrent callers wait on the same lock, so only one exchange is in
    /// flight at a time.
    pub async fn bearer(
        &self,
        http: &reqwest::Client,
        config: &CatalogConfig,
    ) -> Result<String, CatalogError> {
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.value.clone());
        }

        let response = request_token(http, config).await?;
        tracing::debug!("Obtained catalog token valid for {}s", response.expires_in);

        let token = CachedToken {
            value: response.access_token,
            expires_at: Instant::now() + Duration::from_secs(response.expires_in),
        };
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next call re-authenticates
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }
}

async fn request_token(
    http: &reqwest::Client,
    config: &CatalogConfig,
) -> Result<dto::TokenResponse, CatalogError> {
    let url = format!("{}/api/token", config.accounts_base);

    let response = http
        .post(&url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;

    let status = response.status();

    if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(CatalogError::Auth(
            "client credentials were rejected".to_string(),
        ));
    }

    if !status.is_success() {
        return Err(CatalogError::Auth(format!(
            "HTTP {}: {}",
            status,
            status.canonical_reason().unwrap_or("Unknown")
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;

    serde_json::from_str(&body).map_err(|e| CatalogError::Malformed(format!("token response: {}", e)))
}
