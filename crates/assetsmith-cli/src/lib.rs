//! Wiring for the `assetsmith` binary: builds the real collaborators from
//! [`Config`] and formats sheet rows and audit entries for the terminal.

use anyhow::Context;
use assetsmith_core::models::{AuditEntry, SheetRow};
use assetsmith_core::Config;
use assetsmith_db::{connect_audit_store, AuditLogRepository, AuditStore};
use assetsmith_infra::{ServiceAccountTokenProvider, SHEETS_SCOPES};
use assetsmith_services::{
    AssetGenerator, GenerativeBackend, GoogleSheetsStore, Notifier, OpenAiClient,
    RemoteSampleAudio, SheetStore,
};
use assetsmith_storage::create_storage;
use assetsmith_worker::{ReportService, RowProcessor, RunController};
use std::sync::Arc;
use std::time::Duration;

/// Shared HTTP client for the Google APIs, Slack and the placeholder fetch.
///
/// Only connecting is bounded; uploads may take as long as they need.
pub fn http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.generation.connect_timeout_secs))
        .build()
        .context("Failed to create HTTP client")
}

pub fn sheet_store(
    config: &Config,
    client: reqwest::Client,
) -> anyhow::Result<Arc<dyn SheetStore>> {
    let reference = config.sheet_reference()?;
    let tokens = ServiceAccountTokenProvider::from_file(
        &config.sheet.credentials_path,
        SHEETS_SCOPES,
        client.clone(),
    )?;
    tracing::debug!(
        spreadsheet_id = %reference.spreadsheet_id,
        client_email = %tokens.client_email(),
        "Using service account for Sheets"
    );
    Ok(Arc::new(GoogleSheetsStore::new(
        client,
        Arc::new(tokens),
        reference.spreadsheet_id,
    )))
}

pub async fn audit_store(config: &Config) -> anyhow::Result<Arc<dyn AuditStore>> {
    let pool = connect_audit_store(&config.paths.audit_database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to open audit database {}",
                config.paths.audit_database_url
            )
        })?;
    Ok(Arc::new(AuditLogRepository::new(pool)))
}

fn asset_generator(config: &Config, client: reqwest::Client) -> anyhow::Result<AssetGenerator> {
    let backend: Option<Arc<dyn GenerativeBackend>> = match &config.generation.openai_api_key {
        Some(api_key) if config.uses_generation_backend() => Some(Arc::new(OpenAiClient::new(
            api_key.clone(),
            &config.generation,
        )?)),
        Some(_) => {
            tracing::info!("Demo mode: generating placeholder assets");
            None
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, generating placeholder assets");
            None
        }
    };

    let placeholder_audio = Arc::new(RemoteSampleAudio::new(
        client,
        config.generation.placeholder_audio_url.clone(),
        Duration::from_secs(config.generation.placeholder_fetch_timeout_secs),
    ));

    Ok(AssetGenerator::new(
        backend,
        placeholder_audio,
        config.image_size()?,
    ))
}

/// Run controller over the configured sheet, backend, storage and channels
pub async fn build_controller(
    config: &Config,
    client: reqwest::Client,
) -> anyhow::Result<RunController> {
    let sheets = sheet_store(config, client.clone())?;
    let storage = create_storage(config, client.clone()).await?;
    let processor = RowProcessor::new(
        sheets.clone(),
        asset_generator(config, client.clone())?,
        storage,
        audit_store(config).await?,
        Notifier::from_config(config, client),
        config.paths.output_dir.clone(),
        config.storage.destination_folder(),
    );
    Ok(RunController::new(sheets, processor, config.flags))
}

pub async fn build_report_service(
    config: &Config,
    client: reqwest::Client,
) -> anyhow::Result<ReportService> {
    Ok(ReportService::new(
        audit_store(config).await?,
        create_storage(config, client.clone()).await?,
        Notifier::from_config(config, client),
        config.paths.report_dir.clone(),
        config.storage.destination_folder(),
    ))
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn format_rows_table(rows: &[SheetRow]) -> String {
    let mut out = format!(
        "{:<6} {:<10} {:<8} {:<6} {:<10} {}\n",
        "LINE", "ID", "STATUS", "FORMAT", "MODEL", "DESCRIPTION"
    );
    for row in rows {
        let record = &row.record;
        out.push_str(&format!(
            "{:<6} {:<10} {:<8} {:<6} {:<10} {}\n",
            row.row_number(),
            truncate_string(&row.identifier(), 10),
            record.status().to_string(),
            record.format_label(),
            truncate_string(record.model_tag(), 10),
            truncate_string(record.description(), 50),
        ));
    }
    out
}

pub fn format_history_table(entries: &[AuditEntry]) -> String {
    let mut out = format!(
        "{:<20} {:<10} {:<8} {:<6} {}\n",
        "TIMESTAMP", "ROW", "STATUS", "FORMAT", "URL / ERROR"
    );
    for entry in entries {
        let detail = if entry.error.is_empty() {
            &entry.output_url
        } else {
            &entry.error
        };
        out.push_str(&format!(
            "{:<20} {:<10} {:<8} {:<6} {}\n",
            entry.ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            truncate_string(&entry.row_id, 10),
            entry.status.to_string(),
            entry.output_format,
            truncate_string(detail, 70),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetsmith_core::models::{AuditStatus, TaskRecord};
    use chrono::TimeZone;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("épée de feu", 6), "épé...");
        assert_eq!(truncate_string("hello", 0), "...");
    }

    #[test]
    fn rows_table_shows_line_and_defaults() {
        let rows = vec![SheetRow::new(
            0,
            TaskRecord {
                id: "7".to_string(),
                description: "a red sword icon".to_string(),
                ..Default::default()
            },
        )];
        let table = format_rows_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("LINE"));
        assert!(lines[1].starts_with("2 "));
        assert!(lines[1].contains("pending"));
        assert!(lines[1].contains("PNG"));
        assert!(lines[1].contains("OpenAI"));
        assert!(lines[1].ends_with("a red sword icon"));
    }

    #[test]
    fn history_table_prefers_error_text() {
        let entry = AuditEntry {
            ts: chrono::Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            row_id: "9".to_string(),
            description: "scroll".to_string(),
            example_url: String::new(),
            output_format: "TXT".to_string(),
            model: "OpenAI".to_string(),
            output_url: String::new(),
            status: AuditStatus::Fail,
            error: "Unsupported output_format: TXT".to_string(),
        };
        let table = format_history_table(&[entry]);
        let row = table.lines().nth(1).unwrap();
        assert!(row.starts_with("2026-03-01 09:30:00"));
        assert!(row.contains("fail"));
        assert!(row.ends_with("Unsupported output_format: TXT"));
    }
}
