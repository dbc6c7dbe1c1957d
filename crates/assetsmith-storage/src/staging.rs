//! Local staging of generated files before upload.
//!
//! Files are named `{prefix}_{unix_ts}.{ext}`. If that name is already taken (a
//! second attempt for the same row within one second, or a concurrent run) a
//! `_{n}` suffix is added; an existing file is never overwritten.

use crate::traits::{StorageError, StorageResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Write `data` into `dir` under a fresh name derived from `prefix` and the current time
pub async fn stage_artifact(
    dir: &Path,
    prefix: &str,
    extension: &str,
    data: &[u8],
) -> StorageResult<PathBuf> {
    stage_artifact_at(dir, prefix, chrono::Utc::now().timestamp(), extension, data).await
}

/// Same as [`stage_artifact`] with an explicit timestamp
pub async fn stage_artifact_at(
    dir: &Path,
    prefix: &str,
    timestamp: i64,
    extension: &str,
    data: &[u8],
) -> StorageResult<PathBuf> {
    fs::create_dir_all(dir).await?;

    let stem = format!("{}_{}", sanitize_prefix(prefix), timestamp);

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let filename = if attempt == 0 {
            format!("{}.{}", stem, extension)
        } else {
            format!("{}_{}.{}", stem, attempt, extension)
        };
        let path = dir.join(filename);

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };

        file.write_all(data).await?;
        file.sync_all().await?;

        tracing::debug!(path = %path.display(), size_bytes = data.len(), "Staged artifact");
        return Ok(path);
    }

    Err(StorageError::UploadFailed(format!(
        "Could not find a free file name for {} in {}",
        stem,
        dir.display()
    )))
}

/// Keep names filesystem-safe; row ids come straight from the sheet
fn sanitize_prefix(prefix: &str) -> String {
    let cleaned: String = prefix
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "row".to_string()
    } else {
        cleaned
    }
}
