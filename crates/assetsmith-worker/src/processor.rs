//! Row processor
//!
//! One call to [`RowProcessor::process`] takes a pending row to a terminal
//! outcome: prompt, generation, conversion, staging, upload, notification, then
//! the audit entry and the sheet update. The first failing step short-circuits to
//! the failure path; nothing after it runs except the failure notifications and
//! the two writes that record the outcome.

use assetsmith_core::constants::{CLAUDE_PROMPT_CONSTRAINTS, DEFAULT_NARRATION, MAX_ERROR_CHARS};
use assetsmith_core::models::{
    AuditEntry, AuditStatus, MediaKind, OutputFormat, RowOutcome, SheetRow, TaskRecord,
};
use assetsmith_core::{truncate_chars, AppError, ErrorMetadata, LogLevel};
use assetsmith_db::AuditStore;
use assetsmith_processing::ImageConverter;
use assetsmith_services::{AssetGenerator, GeneratedAsset, Notifier, SheetStore};
use assetsmith_storage::{stage_artifact, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Prompt sent to the image backend for a row
pub fn build_image_prompt(record: &TaskRecord) -> String {
    let mut prompt = record.description().to_string();
    let reference = record.example_url();
    if !reference.is_empty() {
        prompt.push_str("\nReference: ");
        prompt.push_str(reference);
    }
    if record.uses_claude_prompt() {
        prompt.push_str(CLAUDE_PROMPT_CONSTRAINTS);
    }
    prompt
}

/// Text read out for an audio row
pub fn narration_text(record: &TaskRecord) -> &str {
    match record.description() {
        "" => DEFAULT_NARRATION,
        description => description,
    }
}

pub struct RowProcessor {
    sheets: Arc<dyn SheetStore>,
    generator: AssetGenerator,
    storage: Arc<dyn Storage>,
    audit: Arc<dyn AuditStore>,
    notifier: Notifier,
    output_dir: PathBuf,
    destination_folder: String,
}

impl RowProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sheets: Arc<dyn SheetStore>,
        generator: AssetGenerator,
        storage: Arc<dyn Storage>,
        audit: Arc<dyn AuditStore>,
        notifier: Notifier,
        output_dir: PathBuf,
        destination_folder: String,
    ) -> Self {
        Self {
            sheets,
            generator,
            storage,
            audit,
            notifier,
            output_dir,
            destination_folder,
        }
    }

    /// Resolve one row and record the outcome.
    ///
    /// Pipeline failures never surface as `Err`; they become a `Failed` outcome.
    /// `Err` means the outcome could not be persisted (audit log or sheet).
    #[tracing::instrument(skip(self, row), fields(
        row_number = row.row_number(),
        row_id = %row.identifier(),
    ))]
    pub async fn process(&self, row: &SheetRow) -> Result<RowOutcome, AppError> {
        let row_id = row.identifier();
        let start = Instant::now();

        let outcome = match self.produce(row, &row_id).await {
            Ok(url) => {
                tracing::info!(
                    url = %url,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Row done"
                );
                RowOutcome::Success { output_url: url }
            }
            Err(e) => {
                let error = truncate_chars(&e.to_string(), MAX_ERROR_CHARS);
                match e.log_level() {
                    LogLevel::Debug => tracing::debug!(error = %error, "Row failed"),
                    LogLevel::Warn => tracing::warn!(error = %error, "Row failed"),
                    LogLevel::Error => tracing::error!(
                        error = %error,
                        error_code = e.error_code(),
                        "Row failed"
                    ),
                }
                self.notify_failure(&row_id, &error).await;
                RowOutcome::Failed { error }
            }
        };

        self.record(row, &row_id, &outcome).await?;
        Ok(outcome)
    }

    /// Steps up to and including the success notifications; returns the public URL
    async fn produce(&self, row: &SheetRow, row_id: &str) -> Result<String, AppError> {
        let record = &row.record;
        let format = record.output_format()?;

        let asset = self.generate(record, format).await?;
        if asset.placeholder {
            tracing::info!(format = %format, "Using placeholder asset");
        }

        let bytes = match format.media_kind() {
            MediaKind::Image => ImageConverter::convert(&asset.bytes, format)
                .map_err(|e| AppError::ImageProcessing(format!("{:#}", e)))?,
            MediaKind::Audio => asset.bytes,
        };

        let local_path = stage_artifact(&self.output_dir, row_id, format.extension(), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to stage artifact: {}", e)))?;

        let stored = self
            .storage
            .upload_file(&local_path, &self.destination_folder)
            .await?;

        self.notifier
            .chat(&format!("✅ Row {}: {} created. {}", row_id, format, stored.url))
            .await;
        self.notifier
            .mail_admin(&format!("[OK] Asset generated for row {}", row_id), &stored.url)
            .await;

        Ok(stored.url)
    }

    async fn generate(
        &self,
        record: &TaskRecord,
        format: OutputFormat,
    ) -> Result<GeneratedAsset, AppError> {
        match format.media_kind() {
            MediaKind::Image => {
                self.generator
                    .generate_image(&build_image_prompt(record))
                    .await
            }
            MediaKind::Audio => self.generator.generate_audio(narration_text(record)).await,
        }
    }

    async fn notify_failure(&self, row_id: &str, error: &str) {
        self.notifier
            .chat(&format!("❌ Row {} failed: {}", row_id, error))
            .await;
        self.notifier
            .mail_admin(&format!("[FAIL] Row {}", row_id), error)
            .await;
    }

    /// Audit entry first, then the three outcome cells.
    ///
    /// The sheet is written even when the audit append fails; the first error wins.
    async fn record(
        &self,
        row: &SheetRow,
        row_id: &str,
        outcome: &RowOutcome,
    ) -> Result<(), AppError> {
        let record = &row.record;
        let cells = outcome.cells();
        let entry = AuditEntry {
            ts: chrono::Utc::now(),
            row_id: row_id.to_string(),
            description: record.description().to_string(),
            example_url: record.example_url().to_string(),
            output_format: record.format_label(),
            model: record.model_tag().to_string(),
            output_url: cells.output_url.to_string(),
            status: if outcome.is_success() {
                AuditStatus::Success
            } else {
                AuditStatus::Fail
            },
            error: cells.error.to_string(),
        };

        let audited = self.audit.append(&entry).await;
        if let Err(e) = &audited {
            tracing::error!(error = %e, "Failed to append audit entry");
        }

        self.sheets
            .write_outcome(row.row_number(), outcome)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to write row outcome"))?;

        audited
    }
}
