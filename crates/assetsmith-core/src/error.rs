//! Error types module
//!
//! All failures that cross a crate boundary are unified under [`AppError`]. The
//! variants follow the processing pipeline: configuration problems abort the whole
//! run, everything else fails (at most) a single row.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected rejections such as unsupported formats
    Debug,
    /// Warning level - for swallowed side-channel failures
    Warn,
    /// Error level - for failures that resolve a row as failed or abort a run
    Error,
}

/// Metadata describing how an error should be reported and whether it stops the run
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "UPLOAD_ERROR")
    fn error_code(&self) -> &'static str;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;

    /// Whether this error aborts the whole run instead of failing a single row
    fn aborts_run(&self) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported output_format: {0}")]
    UnsupportedFormat(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Spreadsheet error: {0}")]
    Sheet(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(SqlxError::Migrate(Box::new(err)))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: format!("{:#}", err),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AppError::Generation(_) => "GENERATION_ERROR",
            AppError::Upload(_) => "UPLOAD_ERROR",
            AppError::Notification(_) => "NOTIFICATION_ERROR",
            AppError::Sheet(_) => "SHEET_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::ImageProcessing(_) => "IMAGE_PROCESSING_ERROR",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::UnsupportedFormat(_) => LogLevel::Debug,
            AppError::Notification(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }

    fn aborts_run(&self) -> bool {
        matches!(self, AppError::Configuration(_))
    }
}
