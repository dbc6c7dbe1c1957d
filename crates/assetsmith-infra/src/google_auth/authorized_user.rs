use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tokio::sync::Mutex;

use super::{request_token, AccessTokenProvider, CachedToken, DEFAULT_TOKEN_URI};

/// Contents of an authorized-user `token.json`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUserToken {
    #[serde(default)]
    pub token: Option<String>,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

/// Refreshes a previously authorized user's access token.
///
/// The token file must already exist; the interactive consent flow that creates
/// it is not part of the job.
pub struct AuthorizedUserTokenProvider {
    credentials: AuthorizedUserToken,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl AuthorizedUserTokenProvider {
    pub fn new(credentials: AuthorizedUserToken, client: reqwest::Client) -> Self {
        let cached = match (&credentials.token, credentials.expiry) {
            (Some(token), Some(expires_at)) => Some(CachedToken {
                token: token.clone(),
                expires_at,
            }),
            _ => None,
        };
        Self {
            credentials,
            client,
            cached: Mutex::new(cached),
        }
    }

    pub fn from_file(path: &Path, client: reqwest::Client) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to read Drive token {}: {}. Authorize the Drive account first",
                path.display(),
                e
            )
        })?;
        let credentials: AuthorizedUserToken = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid Drive token {}: {}", path.display(), e))?;
        Ok(Self::new(credentials, client))
    }
}

#[async_trait]
impl AccessTokenProvider for AuthorizedUserTokenProvider {
    async fn access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.token.clone());
        }

        let token_uri = self
            .credentials
            .token_uri
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_URI);
        let response = request_token(
            &self.client,
            token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
            ],
        )
        .await?;

        tracing::debug!(expires_in = response.expires_in, "Refreshed Drive access token");

        let token = response.into_cached(now);
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }
}
