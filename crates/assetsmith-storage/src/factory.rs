#[cfg(feature = "storage-drive")]
use crate::DriveStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use assetsmith_core::Config;
#[cfg(feature = "storage-drive")]
use assetsmith_infra::{
    AccessTokenProvider, AuthorizedUserTokenProvider, ServiceAccountTokenProvider,
    DRIVE_FILE_SCOPE,
};
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(
    config: &Config,
    client: reqwest::Client,
) -> StorageResult<Arc<dyn Storage>> {
    let settings = &config.storage;

    match settings.backend {
        #[cfg(feature = "storage-drive")]
        StorageBackend::Drive => {
            let tokens = drive_token_provider(config, client.clone())?;
            Ok(Arc::new(DriveStorage::new(client, tokens)))
        }

        #[cfg(not(feature = "storage-drive"))]
        StorageBackend::Drive => Err(StorageError::ConfigError(
            "Drive storage backend not available (storage-drive feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = settings
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = settings.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, settings.s3_endpoint.clone())?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = settings.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = settings.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

/// Uploads run as the authorized user from `token.json` when it exists so files
/// count against that user's quota; otherwise the service account is used.
#[cfg(feature = "storage-drive")]
fn drive_token_provider(
    config: &Config,
    client: reqwest::Client,
) -> StorageResult<Arc<dyn AccessTokenProvider>> {
    let token_path = &config.storage.drive_token_path;

    if token_path.exists() {
        let provider = AuthorizedUserTokenProvider::from_file(token_path, client)
            .map_err(|e| StorageError::ConfigError(format!("{:#}", e)))?;
        tracing::debug!(path = %token_path.display(), "Drive uploads use the authorized user token");
        return Ok(Arc::new(provider));
    }

    let provider = ServiceAccountTokenProvider::from_file(
        &config.sheet.credentials_path,
        &[DRIVE_FILE_SCOPE],
        client,
    )
    .map_err(|e| StorageError::ConfigError(format!("{:#}", e)))?;
    tracing::info!(
        token_path = %token_path.display(),
        "No Drive user token found, uploading as the service account"
    );
    Ok(Arc::new(provider))
}
