//! Storage abstraction trait
//!
//! This module defines the Storage trait that all upload backends implement.

use crate::StorageBackend;
use assetsmith_core::models::OutputFormat;
use assetsmith_core::AppError;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Authorization failed: {0}")]
    AuthFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigError(msg) => AppError::Configuration(msg),
            other => AppError::Upload(other.to_string()),
        }
    }
}

/// A file that has been uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend-specific identifier (object key or Drive file id)
    pub key: String,
    /// Publicly shareable URL
    pub url: String,
}

/// Storage abstraction trait
///
/// Implementations upload one file into a destination folder and return a URL
/// that anyone with the link can open.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload raw bytes as `filename` inside `destination_folder`
    async fn upload(
        &self,
        destination_folder: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject>;

    /// Upload a local file, keeping its file name
    async fn upload_file(
        &self,
        local_path: &Path,
        destination_folder: &str,
    ) -> StorageResult<StoredObject> {
        let filename = local_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StorageError::InvalidKey(format!("Not a file path: {}", local_path.display()))
            })?
            .to_string();
        let content_type = content_type_for(local_path);
        let data = tokio::fs::read(local_path).await?;

        self.upload(destination_folder, &filename, content_type, data)
            .await
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// MIME type derived from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(OutputFormat::from_extension)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}
