use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Source of stand-in narration when the speech backend is unavailable
#[async_trait]
pub trait PlaceholderAudio: Send + Sync {
    async fn fetch(&self) -> Result<Vec<u8>>;
}

/// Downloads a sample MP3, waiting at most `timeout`
pub struct RemoteSampleAudio {
    http_client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl RemoteSampleAudio {
    pub fn new(http_client: reqwest::Client, url: String, timeout: Duration) -> Self {
        Self {
            http_client,
            url,
            timeout,
        }
    }
}

#[async_trait]
impl PlaceholderAudio for RemoteSampleAudio {
    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self
            .http_client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to fetch sample audio from {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Sample audio request returned {}", status));
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read sample audio")?;
        tracing::debug!(url = %self.url, size_bytes = bytes.len(), "Fetched placeholder audio");
        Ok(bytes.to_vec())
    }
}
