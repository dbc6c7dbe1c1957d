//! Assetsmith Storage Library
//!
//! Uploads generated artifacts and reports to a shareable location and returns the
//! public URL written back to the spreadsheet. Backends: Google Drive, S3 (or any
//! S3-compatible provider) and the local filesystem.
//!
//! # Storage key format
//!
//! Keys are `{destination_folder}/{filename}` for the S3 and local backends. Drive
//! has no key paths; the folder is the parent folder id and the key is the file id.
//! Keys must not contain `..` or a leading `/`.

#[cfg(feature = "storage-drive")]
pub mod drive;
pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod staging;
pub mod traits;

// Re-export commonly used types
pub use assetsmith_core::StorageBackend;
#[cfg(feature = "storage-drive")]
pub use drive::DriveStorage;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use staging::stage_artifact;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
