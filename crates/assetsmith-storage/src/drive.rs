use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use assetsmith_infra::{google_api_error, AccessTokenProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// Google Drive storage implementation
///
/// Files are created in a parent folder through a resumable upload session, then
/// shared as "anyone with the link can view".
pub struct DriveStorage {
    client: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
    upload_base: String,
    api_base: String,
}

impl DriveStorage {
    pub fn new(client: reqwest::Client, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self::with_endpoints(client, tokens, DRIVE_UPLOAD_BASE, DRIVE_API_BASE)
    }

    /// Point the client at other API roots (used by tests)
    pub fn with_endpoints(
        client: reqwest::Client,
        tokens: Arc<dyn AccessTokenProvider>,
        upload_base: &str,
        api_base: &str,
    ) -> Self {
        Self {
            client,
            tokens,
            upload_base: upload_base.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Shareable viewer link for a Drive file
    pub fn view_url(file_id: &str) -> String {
        format!("https://drive.google.com/file/d/{}/view", file_id)
    }

    async fn token(&self) -> StorageResult<String> {
        self.tokens
            .access_token()
            .await
            .map_err(|e| StorageError::AuthFailed(format!("{:#}", e)))
    }

    async fn start_session(
        &self,
        token: &str,
        parent_folder_id: &str,
        filename: &str,
        content_type: &str,
        size: usize,
    ) -> StorageResult<String> {
        let mut metadata = json!({ "name": filename });
        if !parent_folder_id.is_empty() {
            metadata["parents"] = json!([parent_folder_id]);
        }

        let response = self
            .client
            .post(format!("{}/files", self.upload_base))
            .query(&[
                ("uploadType", "resumable"),
                ("fields", "id"),
                ("supportsAllDrives", "true"),
            ])
            .bearer_auth(token)
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", size.to_string())
            .json(&metadata)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Drive session request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadFailed(google_api_error(status, &body)));
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .ok_or_else(|| {
                StorageError::BackendError("Drive did not return an upload session URL".to_string())
            })
    }

    async fn send_content(
        &self,
        token: &str,
        session_url: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<DriveFile> {
        let response = self
            .client
            .put(session_url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Drive upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadFailed(google_api_error(status, &body)));
        }

        response.json::<DriveFile>().await.map_err(|e| {
            StorageError::BackendError(format!("Unexpected Drive upload response: {}", e))
        })
    }

    /// Grant "anyone with the link" read access. Failures leave the file private.
    async fn share_publicly(&self, token: &str, file_id: &str) {
        let result = self
            .client
            .post(format!("{}/files/{}/permissions", self.api_base, file_id))
            .query(&[("supportsAllDrives", "true")])
            .bearer_auth(token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(file_id = %file_id, "Drive file shared with link");
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    file_id = %file_id,
                    error = %google_api_error(status, &body),
                    "Failed to share Drive file, link may require sign-in"
                );
            }
            Err(e) => {
                tracing::warn!(
                    file_id = %file_id,
                    error = %e,
                    "Failed to share Drive file, link may require sign-in"
                );
            }
        }
    }
}

#[async_trait]
impl Storage for DriveStorage {
    async fn upload(
        &self,
        destination_folder: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        let start = std::time::Instant::now();
        let size = data.len();
        let token = self.token().await?;

        let session_url = self
            .start_session(&token, destination_folder, filename, content_type, size)
            .await?;
        let file = self
            .send_content(&token, &session_url, content_type, data)
            .await?;

        self.share_publicly(&token, &file.id).await;

        tracing::info!(
            file_id = %file.id,
            folder_id = %destination_folder,
            filename = %filename,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Drive upload successful"
        );

        Ok(StoredObject {
            url: Self::view_url(&file.id),
            key: file.id,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Drive
    }
}
