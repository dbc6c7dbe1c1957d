#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use assetsmith_core::config::RuntimeFlags;
use assetsmith_core::models::{AuditEntry, SheetRow, TaskRecord};
use assetsmith_core::ImageSize;
use assetsmith_db::{connect_audit_store, AuditLogRepository, AuditStore};
use assetsmith_services::{
    AssetGenerator, ChatChannel, GenerativeBackend, MailChannel, Notifier, SheetStore,
};
use assetsmith_worker::{ReportService, RowProcessor, RunController};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use mocks::{
    RecordingBackend, RecordingChat, RecordingMail, RecordingSheet, RecordingStorage, StaticAudio,
};

pub const ADMIN_EMAIL: &str = "ops@example.com";
pub const DESTINATION_FOLDER: &str = "assets";

/// Worker wired to recording doubles and an in-memory audit store
pub struct Harness {
    pub sheet: Arc<RecordingSheet>,
    pub backend: Arc<RecordingBackend>,
    pub audio: Arc<StaticAudio>,
    pub storage: Arc<RecordingStorage>,
    pub chat: Arc<RecordingChat>,
    pub mail: Arc<RecordingMail>,
    pub audit: Arc<AuditLogRepository>,
    pub output_dir: TempDir,
    pub report_dir: TempDir,
    with_backend: bool,
}

impl Harness {
    pub async fn new(rows: Vec<TaskRecord>) -> Self {
        Self::build(rows, true).await
    }

    /// No generative backend: every asset is a placeholder
    pub async fn without_backend(rows: Vec<TaskRecord>) -> Self {
        Self::build(rows, false).await
    }

    async fn build(rows: Vec<TaskRecord>, with_backend: bool) -> Self {
        let pool = connect_audit_store("sqlite::memory:").await.unwrap();
        Self {
            sheet: Arc::new(RecordingSheet::new(rows)),
            backend: Arc::new(RecordingBackend::default()),
            audio: Arc::new(StaticAudio::default()),
            storage: Arc::new(RecordingStorage::default()),
            chat: Arc::new(RecordingChat::default()),
            mail: Arc::new(RecordingMail::default()),
            audit: Arc::new(AuditLogRepository::new(pool)),
            output_dir: TempDir::new().unwrap(),
            report_dir: TempDir::new().unwrap(),
            with_backend,
        }
    }

    pub fn notifier(&self) -> Notifier {
        let chat: Arc<dyn ChatChannel> = self.chat.clone();
        let mail: Arc<dyn MailChannel> = self.mail.clone();
        Notifier::new(Some(chat), Some(mail), Some(ADMIN_EMAIL.to_string()))
    }

    fn generator(&self) -> AssetGenerator {
        let backend = if self.with_backend {
            let backend: Arc<dyn GenerativeBackend> = self.backend.clone();
            Some(backend)
        } else {
            None
        };
        AssetGenerator::new(
            backend,
            self.audio.clone(),
            ImageSize {
                width: 64,
                height: 64,
            },
        )
    }

    pub fn processor(&self) -> RowProcessor {
        RowProcessor::new(
            self.sheet.clone(),
            self.generator(),
            self.storage.clone(),
            self.audit.clone(),
            self.notifier(),
            self.output_dir.path().to_path_buf(),
            DESTINATION_FOLDER.to_string(),
        )
    }

    pub fn controller(&self, flags: RuntimeFlags) -> RunController {
        RunController::new(self.sheet.clone(), self.processor(), flags)
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(
            self.audit.clone(),
            self.storage.clone(),
            self.notifier(),
            self.report_dir.path().to_path_buf(),
            DESTINATION_FOLDER.to_string(),
        )
    }

    /// Current snapshot of the sheet
    pub async fn rows(&self) -> Vec<SheetRow> {
        self.sheet.read_all_rows().await.unwrap()
    }

    /// Audit entries, oldest first
    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        let mut entries = self.audit.list_recent(1000).await.unwrap();
        entries.reverse();
        entries
    }

    pub fn staged_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.output_dir.path())
            .map(|dir| dir.map(|entry| entry.unwrap().path()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }
}

pub fn retry_flags() -> RuntimeFlags {
    RuntimeFlags {
        retry_failed: true,
        ..Default::default()
    }
}
