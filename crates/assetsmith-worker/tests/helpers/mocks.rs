//! Recording test doubles for the worker's collaborators

use assetsmith_core::constants::{
    ERROR_COLUMN, OUTPUT_URL_COLUMN, SHEET_HEADER_ROWS, STATUS_COLUMN,
};
use assetsmith_core::models::{RowStatus, SheetRow, TaskRecord};
use assetsmith_core::{AppError, ImageSize};
use assetsmith_services::{
    ChatChannel, GenerativeBackend, MailChannel, NotifyError, PlaceholderAudio, SheetStore,
};
use assetsmith_storage::{Storage, StorageBackend, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use std::sync::Mutex;

use super::fixtures::tiny_png;

/// In-memory sheet; writes land in the rows so a second run sees them
#[derive(Default)]
pub struct RecordingSheet {
    rows: Mutex<Vec<TaskRecord>>,
    writes: Mutex<Vec<(usize, usize, String)>>,
    fail_writes: Mutex<Option<AppError>>,
}

impl RecordingSheet {
    pub fn new(rows: Vec<TaskRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn record(&self, index: usize) -> TaskRecord {
        self.rows.lock().unwrap()[index].clone()
    }

    pub fn status(&self, index: usize) -> RowStatus {
        self.record(index).status()
    }

    /// Every `(row_number, column, value)` written, in order
    pub fn writes(&self) -> Vec<(usize, usize, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_writes_with(&self, message: &str) {
        *self.fail_writes.lock().unwrap() = Some(AppError::Sheet(message.to_string()));
    }

    /// Every write fails as if the sheet credentials had been revoked
    pub fn revoke_credentials(&self) {
        *self.fail_writes.lock().unwrap() = Some(AppError::Configuration(
            "Google authorization failed: invalid_grant".to_string(),
        ));
    }
}

#[async_trait]
impl SheetStore for RecordingSheet {
    async fn read_all_rows(&self) -> Result<Vec<SheetRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, record)| SheetRow::new(index, record))
            .collect())
    }

    async fn write_cell(
        &self,
        row_number: usize,
        column: usize,
        value: &str,
    ) -> Result<(), AppError> {
        if let Some(error) = self.fail_writes.lock().unwrap().as_ref() {
            return Err(match error {
                AppError::Configuration(message) => AppError::Configuration(message.clone()),
                AppError::Sheet(message) => AppError::Sheet(message.clone()),
                other => AppError::Internal(other.to_string()),
            });
        }
        self.writes
            .lock()
            .unwrap()
            .push((row_number, column, value.to_string()));

        let mut rows = self.rows.lock().unwrap();
        let record = &mut rows[row_number - SHEET_HEADER_ROWS - 1];
        match column {
            STATUS_COLUMN => record.status = value.to_string(),
            OUTPUT_URL_COLUMN => record.output_url = value.to_string(),
            ERROR_COLUMN => record.error = value.to_string(),
            other => panic!("unexpected column {}", other),
        }
        Ok(())
    }
}

/// Generative backend that returns a small PNG and MP3 stub, or a configured error
#[derive(Default)]
pub struct RecordingBackend {
    image_prompts: Mutex<Vec<String>>,
    speech_texts: Mutex<Vec<String>>,
    error: Mutex<Option<String>>,
}

impl RecordingBackend {
    pub fn fail_with(&self, message: &str) {
        *self.error.lock().unwrap() = Some(message.to_string());
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.image_prompts.lock().unwrap().clone()
    }

    pub fn speech_texts(&self) -> Vec<String> {
        self.speech_texts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.image_prompts().len() + self.speech_texts().len()
    }

    fn result(&self, ok: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        match self.error.lock().unwrap().clone() {
            Some(message) => Err(anyhow::anyhow!(message)),
            None => Ok(ok),
        }
    }
}

#[async_trait]
impl GenerativeBackend for RecordingBackend {
    async fn generate_image(&self, prompt: &str, _size: ImageSize) -> anyhow::Result<Vec<u8>> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());
        self.result(tiny_png())
    }

    async fn generate_speech(&self, text: &str) -> anyhow::Result<Vec<u8>> {
        self.speech_texts.lock().unwrap().push(text.to_string());
        self.result(b"ID3 generated speech".to_vec())
    }
}

pub const PLACEHOLDER_MP3: &[u8] = b"ID3 placeholder sample";

#[derive(Default)]
pub struct StaticAudio {
    fetches: Mutex<usize>,
}

impl StaticAudio {
    pub fn fetches(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl PlaceholderAudio for StaticAudio {
    async fn fetch(&self) -> anyhow::Result<Vec<u8>> {
        *self.fetches.lock().unwrap() += 1;
        Ok(PLACEHOLDER_MP3.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub folder: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Default)]
pub struct RecordingStorage {
    uploads: Mutex<Vec<Upload>>,
    error: Mutex<Option<String>>,
}

impl RecordingStorage {
    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn fail_with(&self, message: &str) {
        *self.error.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload(
        &self,
        destination_folder: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(StorageError::UploadFailed(message));
        }
        self.uploads.lock().unwrap().push(Upload {
            folder: destination_folder.to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        let key = format!("{}/{}", destination_folder, filename);
        Ok(StoredObject {
            url: format!("https://storage.test/{}", key),
            key,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[derive(Default)]
pub struct RecordingChat {
    messages: Mutex<Vec<String>>,
}

impl RecordingChat {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatChannel for RecordingChat {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMail {
    sent: Mutex<Vec<Mail>>,
    refuse: Mutex<bool>,
}

impl RecordingMail {
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().unwrap().clone()
    }

    /// Make every send fail, as an unreachable SMTP server would
    pub fn refuse(&self) {
        *self.refuse.lock().unwrap() = true;
    }
}

#[async_trait]
impl MailChannel for RecordingMail {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if *self.refuse.lock().unwrap() {
            return Err(NotifyError::Mail("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(Mail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
