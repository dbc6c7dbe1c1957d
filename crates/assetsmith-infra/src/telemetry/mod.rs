//! Telemetry initialization
//!
//! Installs the global `tracing` subscriber. Filtering follows `RUST_LOG`; output is
//! human-readable unless `LOG_FORMAT=json`.

mod init_basic;

pub use init_basic::{init_telemetry, LogFormat};
