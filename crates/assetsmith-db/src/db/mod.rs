//! Database repositories
//
// Audit log (append-only processing history)
pub mod audit;

pub use audit::{connect_audit_store, AuditLogRepository, AuditStore};
