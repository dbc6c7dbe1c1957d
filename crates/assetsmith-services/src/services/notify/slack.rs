use async_trait::async_trait;
use serde_json::json;

use super::{ChatChannel, NotifyError};

/// Slack incoming webhook
pub struct SlackWebhook {
    http_client: reqwest::Client,
    webhook_url: String,
}

impl SlackWebhook {
    pub fn new(http_client: reqwest::Client, webhook_url: String) -> Self {
        Self {
            http_client,
            webhook_url,
        }
    }
}

#[async_trait]
impl ChatChannel for SlackWebhook {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| NotifyError::Chat(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Chat(format!("{} - {}", status, body.trim())));
        }

        tracing::debug!("Chat notification sent");
        Ok(())
    }
}
