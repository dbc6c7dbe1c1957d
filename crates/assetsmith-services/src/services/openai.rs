//! OpenAI generative backend
//!
//! Images come from `/images/generations` (inline base64 or a download URL,
//! depending on the model); speech from `/audio/speech` as MP3.

use anyhow::{anyhow, Context, Result};
use assetsmith_core::config::GenerationConfig;
use assetsmith_core::ImageSize;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use super::generator::GenerativeBackend;

const API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: String,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_key: String,
    api_base: String,
    image_model: String,
    tts_model: String,
    tts_voice: String,
}

impl Debug for OpenAiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OpenAiClient")
            .field("api_base", &self.api_base)
            .field("image_model", &self.image_model)
            .field("tts_model", &self.tts_model)
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(api_key: String, settings: &GenerationConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs));
        if let Some(secs) = settings.generation_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .context("Failed to create HTTP client for OpenAI")?;

        Ok(Self {
            http_client,
            api_key,
            api_base: API_BASE.to_string(),
            image_model: settings.image_model.clone(),
            tts_model: settings.tts_model.clone(),
            tts_voice: settings.tts_voice.clone(),
        })
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Turn a non-success response into an error carrying the API's own message
    async fn api_error(what: &str, response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => anyhow!(
                "OpenAI {} request failed: {} - {} ({})",
                what,
                status,
                envelope.error.message,
                envelope.error.error_type.unwrap_or_else(|| "unknown".to_string())
            ),
            Err(_) => anyhow!("OpenAI {} request failed: {} - {}", what, status, body.trim()),
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .context("Failed to download generated image")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Generated image download failed: {}", status));
        }

        Ok(response
            .bytes()
            .await
            .context("Failed to read generated image")?
            .to_vec())
    }
}

#[async_trait]
impl GenerativeBackend for OpenAiClient {
    async fn generate_image(&self, prompt: &str, size: ImageSize) -> Result<Vec<u8>> {
        let start = std::time::Instant::now();
        let body = ImageRequest {
            model: &self.image_model,
            prompt,
            size: size.to_string(),
            n: 1,
        };

        let response = self
            .http_client
            .post(format!("{}/images/generations", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to OpenAI images API")?;

        if !response.status().is_success() {
            return Err(Self::api_error("image", response).await);
        }

        let parsed: ImageResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI images response")?;

        let image = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenAI images response contained no data"))?;

        let bytes = match (image.b64_json, image.url) {
            (Some(b64), _) => base64::engine::general_purpose::STANDARD
                .decode(b64.as_bytes())
                .context("Failed to decode base64 image")?,
            (None, Some(url)) => self.download(&url).await?,
            (None, None) => return Err(anyhow!("OpenAI images response had neither data nor url")),
        };

        tracing::info!(
            model = %self.image_model,
            size = %size,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image generated"
        );

        Ok(bytes)
    }

    async fn generate_speech(&self, text: &str) -> Result<Vec<u8>> {
        let start = std::time::Instant::now();
        let body = SpeechRequest {
            model: &self.tts_model,
            voice: &self.tts_voice,
            input: text,
            response_format: "mp3",
        };

        let response = self
            .http_client
            .post(format!("{}/audio/speech", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to OpenAI speech API")?;

        if !response.status().is_success() {
            return Err(Self::api_error("speech", response).await);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read OpenAI speech response")?
            .to_vec();

        tracing::info!(
            model = %self.tts_model,
            voice = %self.tts_voice,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Speech generated"
        );

        Ok(bytes)
    }
}
