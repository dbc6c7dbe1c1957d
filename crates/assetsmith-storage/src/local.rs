use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Files are written under `base_path` and served from `base_url` by whatever
/// static file server fronts that directory.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for uploaded files (e.g., "/srv/assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8080/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    fn key_to_path(&self, storage_key: &str) -> PathBuf {
        self.base_path.join(storage_key)
    }

    fn generate_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.base_url.trim_end_matches('/'), encoded.join("/"))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        destination_folder: &str,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        let key = generate_storage_key(destination_folder, filename)?;
        let path = self.key_to_path(&key);
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            key = %key,
            path = %path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local upload successful"
        );

        Ok(StoredObject { key, url })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_file_copies_into_folder() {
        let root = tempfile::tempdir().unwrap();
        let staged = tempfile::tempdir().unwrap();
        let source = staged.path().join("7_20250101_120000.png");
        tokio::fs::write(&source, b"\x89PNG fake").await.unwrap();

        let storage = LocalStorage::new(root.path(), "http://localhost:8080/files/".to_string())
            .await
            .unwrap();
        let stored = storage.upload_file(&source, "assets").await.unwrap();

        assert_eq!(stored.key, "assets/7_20250101_120000.png");
        assert_eq!(
            stored.url,
            "http://localhost:8080/files/assets/7_20250101_120000.png"
        );
        let copied = tokio::fs::read(root.path().join("assets/7_20250101_120000.png"))
            .await
            .unwrap();
        assert_eq!(copied, b"\x89PNG fake");
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn url_encodes_segments() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(root.path(), "http://host/files".to_string())
            .await
            .unwrap();
        let stored = storage
            .upload("assets", "row 1.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(stored.url, "http://host/files/assets/row%201.png");
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(root.path(), "http://host".to_string())
            .await
            .unwrap();
        let result = storage
            .upload("../outside", "x.png", "image/png", vec![0])
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
