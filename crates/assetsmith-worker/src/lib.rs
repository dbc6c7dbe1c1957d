//! Assetsmith Worker
//!
//! The batch side of the job:
//! - [`RowProcessor`] drives one task row from prompt to resolved outcome
//! - [`RunController`] walks a sheet snapshot and picks the rows to process
//! - [`ReportService`] summarizes the audit log and sends the daily report
//!
//! Everything runs sequentially on the caller's task. Collaborators are passed in
//! explicitly, so the same types run against Google APIs or test doubles.

pub mod controller;
pub mod processor;
pub mod report;

pub use controller::{is_eligible, RunController, RunSummary};
pub use processor::{build_image_prompt, narration_text, RowProcessor};
pub use report::{ReportService, ReportSummary};
