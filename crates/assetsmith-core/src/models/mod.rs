//! Data models for the application
//!
//! Each sub-module covers one part of the row pipeline: the spreadsheet task
//! record, the requested output format, the resolved outcome and the audit log.

mod audit;
mod format;
mod outcome;
mod task_record;

pub use audit::*;
pub use format::*;
pub use outcome::*;
pub use task_record::*;
