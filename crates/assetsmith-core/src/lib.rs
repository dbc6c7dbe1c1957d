//! Assetsmith Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every Assetsmith component: task records read from the spreadsheet, output
//! formats, audit log entries and the runtime switches read at process start.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod text;

// Re-export commonly used types
pub use config::{Config, ImageSize, SheetReference};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
pub use text::truncate_chars;
