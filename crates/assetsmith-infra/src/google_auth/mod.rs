//! Google OAuth access tokens
//!
//! Two credential sources are supported:
//! - a service account key (`credentials.json`), used for the spreadsheet
//! - an authorized-user token file (`token.json`), used for Drive uploads so the
//!   files land in the user's own quota
//!
//! Both cache the access token and refresh it shortly before expiry.

mod authorized_user;
mod service_account;

pub use authorized_user::AuthorizedUserTokenProvider;
pub use service_account::ServiceAccountTokenProvider;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Scopes requested for the spreadsheet client
pub const SHEETS_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.metadata.readonly",
];

/// Scope requested for Drive uploads
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

pub(crate) const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for Google APIs
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Return a valid access token, refreshing it if needed
    async fn access_token(&self) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub(crate) struct CachedToken {
    pub(crate) token: String,
    pub(crate) expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub(crate) fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Successful token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    #[serde(default = "default_expires_in")]
    pub(crate) expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

impl TokenResponse {
    pub(crate) fn into_cached(self, now: DateTime<Utc>) -> CachedToken {
        CachedToken {
            token: self.access_token,
            expires_at: now + Duration::seconds(self.expires_in),
        }
    }
}

/// Post a form to the token endpoint and decode the response
pub(crate) async fn request_token(
    client: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> anyhow::Result<TokenResponse> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to reach token endpoint: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| {
                let error = json.get("error")?.as_str()?.to_string();
                let description = json
                    .get("error_description")
                    .and_then(|d| d.as_str())
                    .unwrap_or_default();
                Some(format!("{} {}", error, description).trim().to_string())
            })
            .unwrap_or(body);
        return Err(anyhow::anyhow!(
            "Token endpoint returned {}: {}",
            status,
            detail
        ));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse token response: {}", e))
}

/// Human-readable message from a Google API error body.
///
/// Google APIs answer with `{"error": {"code": .., "message": ..}}`; anything else
/// is reported verbatim.
pub fn google_api_error(status: reqwest::StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string());
    format!("HTTP {}: {}", status.as_u16(), message)
}
