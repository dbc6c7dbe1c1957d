//! Assetsmith Database Library
//!
//! Persistence for the audit log: one row per processing attempt, stored in a
//! local SQLite file.

pub mod db;

pub use db::{connect_audit_store, AuditLogRepository, AuditStore};
