use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

use super::{request_token, AccessTokenProvider, CachedToken, DEFAULT_TOKEN_URI};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Fields of a service account JSON key that the token exchange needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Exchanges a signed RS256 assertion for an access token
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(key: ServiceAccountKey, scopes: &[&str], client: reqwest::Client) -> Self {
        Self {
            key,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            client,
            cached: Mutex::new(None),
        }
    }

    /// Load a service account key file
    pub fn from_file(
        path: &Path,
        scopes: &[&str],
        client: reqwest::Client,
    ) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read service account key {}: {}", path.display(), e)
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&raw).map_err(|e| {
            anyhow::anyhow!("Invalid service account key {}: {}", path.display(), e)
        })?;
        Ok(Self::new(key, scopes, client))
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn token_uri(&self) -> &str {
        self.key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    fn signed_assertion(&self, now: i64) -> anyhow::Result<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: self.scopes.join(" "),
            aud: self.token_uri(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid service account private key: {}", e))?;

        encode(&header, &claims, &encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to sign service account assertion: {}", e))
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.token.clone());
        }

        let assertion = self.signed_assertion(now.timestamp())?;
        let response = request_token(
            &self.client,
            self.token_uri(),
            &[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())],
        )
        .await?;

        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = response.expires_in,
            "Obtained service account access token"
        );

        let token = response.into_cached(now);
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }
}
