//! Shared key generation for the S3 and local backends.
//!
//! Key format: `{destination_folder}/{filename}`, or just `{filename}` when the
//! folder is empty.

use crate::traits::{StorageError, StorageResult};

/// Reject keys that could escape the storage root
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            key
        )));
    }
    Ok(())
}

/// Generate a storage key for the given folder and filename
pub fn generate_storage_key(destination_folder: &str, filename: &str) -> StorageResult<String> {
    let folder = destination_folder.trim_matches('/');
    let key = if folder.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", folder, filename)
    };
    validate_key(&key)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_folder_and_filename() {
        assert_eq!(
            generate_storage_key("assets", "7_20250101_120000.png").unwrap(),
            "assets/7_20250101_120000.png"
        );
        assert_eq!(
            generate_storage_key("/reports/", "summary.png").unwrap(),
            "reports/summary.png"
        );
        assert_eq!(generate_storage_key("", "a.mp3").unwrap(), "a.mp3");
    }

    #[test]
    fn rejects_traversal() {
        assert!(generate_storage_key("assets", "../etc/passwd").is_err());
        assert!(validate_key("/absolute").is_err());
        assert!(validate_key("").is_err());
    }
}
