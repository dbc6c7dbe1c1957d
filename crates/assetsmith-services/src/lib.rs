//! Assetsmith Services Layer
//!
//! Clients for the external collaborators of the job, each behind the port the
//! worker depends on:
//! - the generative backend (OpenAI images and speech) and the asset generator
//!   that falls back to placeholders
//! - the Google Sheets task store
//! - chat (Slack webhook) and mail (SMTP) notification channels

pub mod services;

pub use services::generator::{
    is_quota_exhausted, AssetGenerator, GeneratedAsset, GenerativeBackend,
};
pub use services::notify::{ChatChannel, MailChannel, Notifier, NotifyError};
pub use services::notify::{email::SmtpMailer, slack::SlackWebhook};
pub use services::openai::OpenAiClient;
pub use services::placeholder_audio::{PlaceholderAudio, RemoteSampleAudio};
pub use services::sheets::{GoogleSheetsStore, SheetStore};
