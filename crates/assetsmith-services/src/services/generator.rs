//! Asset generator
//!
//! Wraps the generative backend with the placeholder path: demo mode (or no
//! backend at all) always yields placeholders, and a backend failure that looks
//! like exhausted quota is downgraded to a placeholder instead of failing the row.

use assetsmith_core::{AppError, ImageSize};
use async_trait::async_trait;
use std::sync::Arc;

use super::placeholder_audio::PlaceholderAudio;

/// Phrases in a backend error that mean the account is out of quota
const QUOTA_MARKERS: [&str; 3] = ["billing", "hard limit", "limit has been reached"];

/// Remote generative backend
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generate an image; the bytes are PNG-encoded
    async fn generate_image(&self, prompt: &str, size: ImageSize) -> anyhow::Result<Vec<u8>>;

    /// Synthesize speech; the bytes are MP3-encoded
    async fn generate_speech(&self, text: &str) -> anyhow::Result<Vec<u8>>;
}

/// Whether a backend error text indicates billing or quota exhaustion
pub fn is_quota_exhausted(error_text: &str) -> bool {
    let text = error_text.to_lowercase();
    QUOTA_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Bytes produced for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAsset {
    pub bytes: Vec<u8>,
    /// True when the bytes are a locally produced stand-in
    pub placeholder: bool,
}

impl GeneratedAsset {
    fn generated(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            placeholder: false,
        }
    }

    fn placeholder(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            placeholder: true,
        }
    }
}

pub struct AssetGenerator {
    backend: Option<Arc<dyn GenerativeBackend>>,
    placeholder_audio: Arc<dyn PlaceholderAudio>,
    image_size: ImageSize,
}

impl AssetGenerator {
    /// `backend` is `None` in demo mode or when no API key is configured
    pub fn new(
        backend: Option<Arc<dyn GenerativeBackend>>,
        placeholder_audio: Arc<dyn PlaceholderAudio>,
        image_size: ImageSize,
    ) -> Self {
        Self {
            backend,
            placeholder_audio,
            image_size,
        }
    }

    /// Generate the baseline (PNG) image for a prompt
    pub async fn generate_image(&self, prompt: &str) -> Result<GeneratedAsset, AppError> {
        let Some(backend) = &self.backend else {
            return self.placeholder_image(prompt);
        };

        match backend.generate_image(prompt, self.image_size).await {
            Ok(bytes) => Ok(GeneratedAsset::generated(bytes)),
            Err(e) => {
                let text = format!("{:#}", e);
                if is_quota_exhausted(&text) {
                    tracing::warn!(error = %text, "Image backend out of quota, using placeholder");
                    self.placeholder_image(prompt)
                } else {
                    Err(AppError::Generation(text))
                }
            }
        }
    }

    /// Generate narration audio (MP3)
    pub async fn generate_audio(&self, text: &str) -> Result<GeneratedAsset, AppError> {
        let Some(backend) = &self.backend else {
            return self.placeholder_audio().await;
        };

        match backend.generate_speech(text).await {
            Ok(bytes) => Ok(GeneratedAsset::generated(bytes)),
            Err(e) => {
                let error_text = format!("{:#}", e);
                if is_quota_exhausted(&error_text) {
                    tracing::warn!(error = %error_text, "Speech backend out of quota, using placeholder");
                    self.placeholder_audio().await
                } else {
                    Err(AppError::Generation(error_text))
                }
            }
        }
    }

    fn placeholder_image(&self, prompt: &str) -> Result<GeneratedAsset, AppError> {
        assetsmith_processing::placeholder_image(prompt, self.image_size)
            .map(GeneratedAsset::placeholder)
            .map_err(|e| AppError::ImageProcessing(format!("{:#}", e)))
    }

    async fn placeholder_audio(&self) -> Result<GeneratedAsset, AppError> {
        self.placeholder_audio
            .fetch()
            .await
            .map(GeneratedAsset::placeholder)
            .map_err(|e| AppError::Generation(format!("Placeholder audio unavailable: {:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn quota_predicate_matches_known_phrases() {
        assert!(is_quota_exhausted("Billing hard limit has been reached"));
        assert!(is_quota_exhausted("You exceeded your current quota, check your BILLING details"));
        assert!(is_quota_exhausted("monthly limit has been reached"));
        assert!(is_quota_exhausted("HARD LIMIT"));
        assert!(!is_quota_exhausted("Rate limit exceeded"));
        assert!(!is_quota_exhausted("connection reset by peer"));
        assert!(!is_quota_exhausted(""));
    }

    struct FailingBackend(&'static str);

    #[async_trait]
    impl GenerativeBackend for FailingBackend {
        async fn generate_image(&self, _: &str, _: ImageSize) -> anyhow::Result<Vec<u8>> {
            Err(anyhow::anyhow!(self.0))
        }

        async fn generate_speech(&self, _: &str) -> anyhow::Result<Vec<u8>> {
            Err(anyhow::anyhow!(self.0))
        }
    }

    struct CountingAudio(AtomicUsize);

    #[async_trait]
    impl PlaceholderAudio for CountingAudio {
        async fn fetch(&self) -> anyhow::Result<Vec<u8>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(b"ID3 sample".to_vec())
        }
    }

    fn small() -> ImageSize {
        ImageSize {
            width: 64,
            height: 64,
        }
    }

    #[tokio::test]
    async fn no_backend_means_placeholders() {
        let audio = Arc::new(CountingAudio(AtomicUsize::new(0)));
        let generator = AssetGenerator::new(None, audio.clone(), small());

        let image = generator.generate_image("sword").await.unwrap();
        assert!(image.placeholder);
        assert!(image.bytes.starts_with(b"\x89PNG"));

        let sound = generator.generate_audio("hello").await.unwrap();
        assert!(sound.placeholder);
        assert_eq!(audio.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn quota_errors_fall_back() {
        let audio = Arc::new(CountingAudio(AtomicUsize::new(0)));
        let generator = AssetGenerator::new(
            Some(Arc::new(FailingBackend("Billing hard limit has been reached"))),
            audio,
            small(),
        );
        assert!(generator.generate_image("x").await.unwrap().placeholder);
        assert!(generator.generate_audio("x").await.unwrap().placeholder);
    }

    #[tokio::test]
    async fn other_errors_are_generation_errors() {
        let generator = AssetGenerator::new(
            Some(Arc::new(FailingBackend("content policy violation"))),
            Arc::new(CountingAudio(AtomicUsize::new(0))),
            small(),
        );
        let err = generator.generate_image("x").await.unwrap_err();
        assert!(matches!(err, AppError::Generation(msg) if msg.contains("content policy")));
    }
}
