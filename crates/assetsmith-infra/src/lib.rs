//! Assetsmith Infrastructure Library
//!
//! Shared infrastructure used by the job binaries:
//! - Telemetry initialization (structured `tracing` output)
//! - Google OAuth access tokens for the Sheets and Drive APIs

pub mod google_auth;
pub mod telemetry;

// Re-export commonly used types
pub use google_auth::{
    google_api_error, AccessTokenProvider, AuthorizedUserTokenProvider,
    ServiceAccountTokenProvider, DRIVE_FILE_SCOPE, SHEETS_SCOPES,
};
pub use telemetry::{init_telemetry, LogFormat};
