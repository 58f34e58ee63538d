use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{config::SpotifyConfig, error::SyncError, types::TokenResponse};

/// A cached token counts as stale this long before its actual expiry.
pub const EXPIRY_BUFFER_MS: i64 = 30_000;

/// Bearer token together with the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at_ms: i64,
}

impl CachedToken {
    pub fn from_response(response: TokenResponse, issued_at_ms: i64) -> Self {
        Self {
            access_token: response.access_token,
            expires_at_ms: i64::try_from(response.expires_in)
                .unwrap_or(i64::MAX)
                .saturating_mul(1000)
                .saturating_add(issued_at_ms),
        }
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms - EXPIRY_BUFFER_MS
    }
}

/// Process-wide owner of the client-credentials token.
///
/// The cache lock is held while a grant is in flight, so callers that race
/// past an expired token wait for the one refresh instead of issuing their
/// own.
pub struct TokenManager {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(http: Client, config: &SpotifyConfig) -> Self {
        TokenManager {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached token, or performs a grant when it is missing or
    /// within [`EXPIRY_BUFFER_MS`] of expiry.
    pub async fn get_valid_token(&self) -> Result<String, SyncError> {
        let mut cached = self.cached.lock().await;

        let now = Utc::now().timestamp_millis();
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid_at(now)) {
            return Ok(token.access_token.clone());
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    /// Forgets the cached token; the next call performs a grant.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken, SyncError> {
        debug!("Requesting client credentials token from {}", self.token_url);

        let res = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|source| SyncError::Transport {
                endpoint: self.token_url.clone(),
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(SyncError::AuthFailure {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = res.json().await.map_err(|source| SyncError::Transport {
            endpoint: self.token_url.clone(),
            source,
        })?;

        debug!("Received token valid for {}s", body.expires_in);
        Ok(CachedToken::from_response(
            body,
            Utc::now().timestamp_millis(),
        ))
    }
}
