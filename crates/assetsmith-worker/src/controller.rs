//! Run controller: one sequential pass over a snapshot of the sheet

use assetsmith_core::config::RuntimeFlags;
use assetsmith_core::models::{RowStatus, SheetRow};
use assetsmith_core::{AppError, ErrorMetadata};
use assetsmith_services::SheetStore;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::processor::RowProcessor;

/// Whether a row with `status` is processed in this run
pub fn is_eligible(status: RowStatus, retry_failed: bool) -> bool {
    match status {
        RowStatus::Done => false,
        RowStatus::Failed => retry_failed,
        RowStatus::Pending => true,
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub total_rows: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Rows whose outcome could not be written to the audit log or the sheet
    pub persistence_errors: usize,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

pub struct RunController {
    sheets: Arc<dyn SheetStore>,
    processor: RowProcessor,
    flags: RuntimeFlags,
}

impl RunController {
    pub fn new(sheets: Arc<dyn SheetStore>, processor: RowProcessor, flags: RuntimeFlags) -> Self {
        Self {
            sheets,
            processor,
            flags,
        }
    }

    /// Read every row once and process the eligible ones in sheet order.
    ///
    /// A failure to read the sheet is returned, as is a persistence error that
    /// aborts the run (rejected credentials). Any other row failure, or an
    /// outcome that cannot be persisted, is counted and the run moves on.
    pub async fn run_once(&self) -> Result<RunSummary, AppError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", run_id = %run_id);
        self.run_rows(run_id).instrument(span).await
    }

    async fn run_rows(&self, run_id: Uuid) -> Result<RunSummary, AppError> {
        let rows = self.sheets.read_all_rows().await?;

        tracing::info!(
            rows = rows.len(),
            demo_mode = self.flags.demo_mode,
            retry_failed = self.flags.retry_failed,
            skip_email = self.flags.skip_email,
            skip_slack = self.flags.skip_slack,
            "Starting run"
        );

        let mut summary = RunSummary {
            run_id,
            total_rows: rows.len(),
            ..Default::default()
        };

        for row in &rows {
            if !self.should_process(row) {
                summary.skipped += 1;
                continue;
            }

            match self.processor.process(row).await {
                Ok(outcome) if outcome.is_success() => summary.succeeded += 1,
                Ok(_) => summary.failed += 1,
                Err(e) if e.aborts_run() => {
                    tracing::error!(
                        row_number = row.row_number(),
                        error_code = e.error_code(),
                        error = %e,
                        "Aborting run"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(
                        row_number = row.row_number(),
                        error = %e,
                        "Outcome not persisted, continuing"
                    );
                    summary.persistence_errors += 1;
                }
            }
        }

        tracing::info!(
            processed = summary.processed(),
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            persistence_errors = summary.persistence_errors,
            "Run finished"
        );

        Ok(summary)
    }

    fn should_process(&self, row: &SheetRow) -> bool {
        let status = row.record.status();
        let eligible = is_eligible(status, self.flags.retry_failed);
        if !eligible {
            tracing::debug!(
                row_number = row.row_number(),
                status = %status,
                "Skipping row"
            );
        }
        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_rows_are_never_eligible() {
        assert!(!is_eligible(RowStatus::Done, false));
        assert!(!is_eligible(RowStatus::Done, true));
    }

    #[test]
    fn failed_rows_need_the_retry_flag() {
        assert!(!is_eligible(RowStatus::Failed, false));
        assert!(is_eligible(RowStatus::Failed, true));
    }

    #[test]
    fn pending_rows_are_always_eligible() {
        assert!(is_eligible(RowStatus::Pending, false));
        assert!(is_eligible(RowStatus::Pending, true));
    }
}
