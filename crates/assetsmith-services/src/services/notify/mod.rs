//! Operator notifications
//!
//! Channels report delivery failures as [`NotifyError`]; the [`Notifier`] facade
//! used by the worker swallows them (logging at `warn`) so a notification can
//! never change a row's outcome.

pub mod email;
pub mod slack;

use assetsmith_core::{AppError, Config};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Chat delivery failed: {0}")]
    Chat(String),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Invalid mail address: {0}")]
    Address(String),
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        AppError::Notification(err.to_string())
    }
}

/// Chat channel (e.g. a Slack incoming webhook)
#[async_trait]
pub trait ChatChannel: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Mail channel
#[async_trait]
pub trait MailChannel: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Best-effort fan-out to the configured channels. Never returns an error.
#[derive(Clone, Default)]
pub struct Notifier {
    chat: Option<Arc<dyn ChatChannel>>,
    mail: Option<Arc<dyn MailChannel>>,
    admin_email: Option<String>,
}

impl Notifier {
    pub fn new(
        chat: Option<Arc<dyn ChatChannel>>,
        mail: Option<Arc<dyn MailChannel>>,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            chat,
            mail,
            admin_email,
        }
    }

    /// Build the channels allowed by configuration.
    ///
    /// A channel is left out when its skip flag is set or its settings are incomplete.
    pub fn from_config(config: &Config, http_client: reqwest::Client) -> Self {
        let chat: Option<Arc<dyn ChatChannel>> = match &config.notify.slack_webhook_url {
            Some(url) if !config.flags.skip_slack => {
                Some(Arc::new(slack::SlackWebhook::new(http_client, url.clone())))
            }
            _ => None,
        };

        let mail: Option<Arc<dyn MailChannel>> = if config.flags.skip_email {
            None
        } else {
            match email::SmtpMailer::from_config(config) {
                Ok(Some(mailer)) => Some(Arc::new(mailer)),
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Mail channel disabled");
                    None
                }
            }
        };

        tracing::debug!(
            chat = chat.is_some(),
            mail = mail.is_some(),
            "Notification channels configured"
        );

        Self::new(chat, mail, config.notify.admin_email.clone())
    }

    /// Post a chat message, or log it when the channel is off
    pub async fn chat(&self, text: &str) {
        let Some(chat) = &self.chat else {
            tracing::info!(text = %text, "Chat notification skipped");
            return;
        };
        if let Err(e) = chat.send(text).await {
            tracing::warn!(error = %e, "Chat notification failed");
        }
    }

    /// Mail the admin address, or log the subject when the channel is off
    pub async fn mail_admin(&self, subject: &str, body: &str) {
        let (Some(mail), Some(to)) = (&self.mail, &self.admin_email) else {
            tracing::info!(subject = %subject, "Mail notification skipped");
            return;
        };
        if let Err(e) = mail.send(to, subject, body).await {
            tracing::warn!(error = %e, subject = %subject, "Mail notification failed");
        }
    }
}
