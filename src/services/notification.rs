//! Notification service implementation
//!
//! Outbound email goes through the [`Mailer`] trait. `smtp` delivers via
//! lettre; `console` only logs the message, for development.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::models::{AuthUser, Event};
use crate::utils::errors::{EventManagementError, Result};

pub const REGISTRATION_SUBJECT: &str = "Event Registration Confirmation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery backend for outbound email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

/// SMTP delivery through lettre
#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| EventManagementError::Config("mail.smtp_host is required for smtp".to_string()))?;

        let mut builder = SmtpTransport::relay(host)?.port(config.smtp_port);
        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let email = Message::builder()
            .from(
                message
                    .from
                    .parse()
                    .map_err(|e| EventManagementError::Mail(format!("Invalid from address: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| EventManagementError::Mail(format!("Invalid to address: {e}")))?)
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)
            .map_err(|e| EventManagementError::Mail(format!("Failed to build email: {e}")))?;

        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await??;
        Ok(())
    }
}

/// Logs messages instead of sending them
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Email (console backend)"
        );
        Ok(())
    }
}

/// Build the mailer named by `mail.backend`
pub fn mailer_from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    match config.backend.as_str() {
        "smtp" => Ok(Arc::new(SmtpMailer::new(config)?)),
        "console" => Ok(Arc::new(ConsoleMailer)),
        other => Err(EventManagementError::Config(format!("Unknown mail backend: {}", other))),
    }
}

/// Notification service for user-facing email
#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    from_email: String,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, from_email: impl Into<String>) -> Self {
        Self {
            mailer,
            from_email: from_email.into(),
        }
    }

    pub fn registration_confirmation(&self, user: &AuthUser, event: &Event) -> EmailMessage {
        EmailMessage {
            from: self.from_email.clone(),
            to: user.email.clone(),
            subject: REGISTRATION_SUBJECT.to_string(),
            body: format!("You registered for \"{}\".", event.title),
        }
    }

    /// Send the registration confirmation; `Ok(false)` when the user has no address
    pub async fn send_registration_confirmation(&self, user: &AuthUser, event: &Event) -> Result<bool> {
        if user.email.trim().is_empty() {
            debug!(user_id = user.id, event_id = event.id, "No email address, confirmation skipped");
            return Ok(false);
        }

        let message = self.registration_confirmation(user, event);
        self.mailer.send(message).await?;

        info!(user_id = user.id, event_id = event.id, "Registration confirmation sent");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event() -> Event {
        Event {
            id: 3,
            title: "Conf".into(),
            description: "Talks".into(),
            date: Utc::now(),
            location: "Kyiv".into(),
            organizer: 1,
        }
    }

    fn user(email: &str) -> AuthUser {
        AuthUser {
            id: 2,
            username: "bob".into(),
            email: email.into(),
        }
    }

    #[test]
    fn test_confirmation_message() {
        let service = NotificationService::new(Arc::new(ConsoleMailer), "noreply@example.com");
        let message = service.registration_confirmation(&user("bob@example.com"), &event());
        assert_eq!(message.subject, "Event Registration Confirmation");
        assert_eq!(message.body, "You registered for \"Conf\".");
        assert_eq!(message.to, "bob@example.com");
        assert_eq!(message.from, "noreply@example.com");
    }

    #[tokio::test]
    async fn test_blank_address_skipped() {
        let service = NotificationService::new(Arc::new(ConsoleMailer), "noreply@example.com");
        assert!(!service.send_registration_confirmation(&user(""), &event()).await.unwrap());
        assert!(service
            .send_registration_confirmation(&user("bob@example.com"), &event())
            .await
            .unwrap());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let config = MailConfig {
            backend: "carrier-pigeon".into(),
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_email: "noreply@example.com".into(),
        };
        assert!(mailer_from_config(&config).is_err());
    }
}
