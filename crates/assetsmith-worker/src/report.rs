//! Daily report built from the audit log

use assetsmith_core::models::{OutputFormat, StatusCounts};
use assetsmith_core::AppError;
use assetsmith_db::AuditStore;
use assetsmith_processing::render_summary_chart;
use assetsmith_services::Notifier;
use assetsmith_storage::{stage_artifact, Storage};
use std::path::PathBuf;
use std::sync::Arc;

const REPORT_PREFIX: &str = "summary";
const REPORT_SUBJECT: &str = "[Daily Report] Automation Summary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub counts: StatusCounts,
    pub chart_path: PathBuf,
    pub url: String,
}

pub struct ReportService {
    audit: Arc<dyn AuditStore>,
    storage: Arc<dyn Storage>,
    notifier: Notifier,
    report_dir: PathBuf,
    destination_folder: String,
}

impl ReportService {
    pub fn new(
        audit: Arc<dyn AuditStore>,
        storage: Arc<dyn Storage>,
        notifier: Notifier,
        report_dir: PathBuf,
        destination_folder: String,
    ) -> Self {
        Self {
            audit,
            storage,
            notifier,
            report_dir,
            destination_folder,
        }
    }

    /// Count audit entries, chart them, upload the chart and notify.
    ///
    /// Notifications are best-effort; counting, rendering and upload are not.
    #[tracing::instrument(skip(self))]
    pub async fn send_report(&self) -> Result<ReportSummary, AppError> {
        let counts = self.audit.status_counts().await?;

        let chart = render_summary_chart(&counts)
            .map_err(|e| AppError::ImageProcessing(format!("{:#}", e)))?;
        let chart_path = stage_artifact(
            &self.report_dir,
            REPORT_PREFIX,
            OutputFormat::Png.extension(),
            &chart,
        )
        .await
        .map_err(|e| AppError::Internal(format!("Failed to stage report chart: {}", e)))?;

        let stored = self
            .storage
            .upload_file(&chart_path, &self.destination_folder)
            .await?;

        tracing::info!(
            success = counts.success,
            fail = counts.fail,
            url = %stored.url,
            "Report uploaded"
        );

        self.notifier
            .mail_admin(
                REPORT_SUBJECT,
                &format!("Success={}, Fail={}\n{}", counts.success, counts.fail, stored.url),
            )
            .await;
        self.notifier
            .chat(&format!(
                "📈 Daily report sent. Success={}, Fail={}\n{}",
                counts.success, counts.fail, stored.url
            ))
            .await;

        Ok(ReportSummary {
            counts,
            chart_path,
            url: stored.url,
        })
    }
}
