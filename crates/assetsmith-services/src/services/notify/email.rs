//! SMTP mail channel

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

use assetsmith_core::Config;

use super::{MailChannel, NotifyError};

/// Port for SMTP over implicit TLS; any other port uses STARTTLS
const SMTPS_PORT: u16 = 465;

/// Sends plain-text mail through an authenticated SMTP relay
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create the mailer from config. Returns `Ok(None)` when credentials or the
    /// admin address are not configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, NotifyError> {
        let settings = &config.notify;
        let (Some(user), Some(password), Some(_)) = (
            settings.smtp_user.as_deref(),
            settings.smtp_app_password.as_deref(),
            settings.admin_email.as_deref(),
        ) else {
            tracing::debug!("SMTP not configured, mail channel off");
            return Ok(None);
        };

        let from: Mailbox = user
            .parse()
            .map_err(|e| NotifyError::Address(format!("SMTP_USER {}: {}", user, e)))?;

        let builder = if settings.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
        }
        .map_err(|e| NotifyError::Mail(e.to_string()))?;

        let mailer = builder
            .port(settings.smtp_port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        tracing::info!(
            host = %settings.smtp_host,
            port = settings.smtp_port,
            "Mail channel initialized"
        );

        Ok(Some(Self {
            mailer: Arc::new(mailer),
            from,
        }))
    }
}

/// Build a plain-text message
pub fn build_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<Message, NotifyError> {
    let to: Mailbox = to
        .parse()
        .map_err(|e| NotifyError::Address(format!("{}: {}", to, e)))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| NotifyError::Mail(e.to_string()))
}

#[async_trait::async_trait]
impl MailChannel for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let email = build_message(&self.from, to, subject, body)?;
        self.mailer
            .send(email)
            .await
            .map_err(|e| NotifyError::Mail(e.to_string()))?;
        tracing::info!(subject = %subject, "Mail notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_has_plain_text_headers() {
        let from: Mailbox = "bot@example.com".parse().unwrap();
        let message = build_message(
            &from,
            "ops@example.com",
            "[FAIL] Row 7",
            "Upload error: quota",
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: bot@example.com"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("Subject: [FAIL] Row 7"));
        assert!(raw.contains("Upload error: quota"));
    }

    #[test]
    fn bad_recipient_is_rejected() {
        let from: Mailbox = "bot@example.com".parse().unwrap();
        let err = build_message(&from, "not an address", "s", "b").unwrap_err();
        assert!(matches!(err, NotifyError::Address(_)));
    }

    #[test]
    fn missing_credentials_means_no_mailer() {
        let config = Config::from_lookup(|key| match key {
            "SMTP_USER" => Some("bot@example.com".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(SmtpMailer::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn configured_mailer_builds_without_connecting() {
        let config = Config::from_lookup(|key| match key {
            "SMTP_USER" => Some("bot@example.com".to_string()),
            "SMTP_APP_PASSWORD" => Some("app-password".to_string()),
            "ADMIN_EMAIL" => Some("ops@example.com".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(SmtpMailer::from_config(&config).unwrap().is_some());
    }
}
