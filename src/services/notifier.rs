// src/services/notifier.rs

//! Digest delivery, over SMTP or into a local outbox.
//!
//! ## Outbox Layout
//!
//! ```text
//! {outbox}/
//! └── digest-YYYYMMDD-HHMMSS.eml   # One MIME message per run
//! ```

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::NotifierConfig;
use crate::services::Digest;

/// Sender and single recipient of a digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub sender: String,
    pub address: String,
}

impl Recipient {
    /// Resolve addresses from the process environment.
    pub fn from_env(config: &NotifierConfig) -> Result<Self> {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    /// Resolve addresses through `lookup`.
    ///
    /// The sender is required; the recipient defaults to the sender.
    pub fn resolve(
        config: &NotifierConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sender = non_empty(&config.sender_env).ok_or_else(|| {
            AppError::delivery(format!("sender address not set ({})", config.sender_env))
        })?;
        let address = non_empty(&config.recipient_env).unwrap_or_else(|| sender.clone());

        Ok(Self { sender, address })
    }
}

/// Where a digest ended up.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub recipient: String,
    pub location: String,
}

/// Delivers a rendered digest to a recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, digest: &Digest, recipient: &Recipient) -> Result<DeliveryReceipt>;
}

/// Build the MIME message for a digest.
///
/// Header encoding (RFC 2047 for the non-ASCII subject) and the body's
/// transfer encoding are left to lettre.
pub fn compose(digest: &Digest, recipient: &Recipient) -> Result<Message> {
    Message::builder()
        .from(mailbox(&recipient.sender)?)
        .to(mailbox(&recipient.address)?)
        .subject(digest.subject.as_str())
        .date(SystemTime::from(digest.generated_at))
        .header(ContentType::TEXT_HTML)
        .body(digest.html.clone())
        .map_err(|e| AppError::delivery(format!("cannot build message: {e}")))
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::delivery(format!("invalid address {address:?}: {e}")))
}

/// Sends each digest through an authenticated SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    endpoint: String,
}

impl SmtpNotifier {
    /// Log in as `sender`, reading the password from the process environment.
    pub fn from_env(config: &NotifierConfig, sender: &str) -> Result<Self> {
        Self::resolve(config, sender, |key| std::env::var(key).ok())
    }

    /// Log in as `sender`, reading the password through `lookup`.
    ///
    /// Uses implicit TLS unless `smtp_starttls` is set.
    pub fn resolve(
        config: &NotifierConfig,
        sender: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let password = lookup(&config.password_env)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AppError::delivery(format!("SMTP password not set ({})", config.password_env))
            })?;

        let builder = if config.smtp_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        }
        .map_err(|e| AppError::delivery(format!("SMTP relay {}: {e}", config.smtp_host)))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(sender.to_string(), password))
            .build();

        Ok(Self {
            transport,
            endpoint: format!("smtp://{}:{}", config.smtp_host, config.smtp_port),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, digest: &Digest, recipient: &Recipient) -> Result<DeliveryReceipt> {
        let message = compose(digest, recipient)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::delivery(format!("{}: {}", self.endpoint, e)))?;

        log::info!("Digest sent to {} via {}", recipient.address, self.endpoint);

        Ok(DeliveryReceipt {
            recipient: recipient.address.clone(),
            location: self.endpoint.clone(),
        })
    }
}

/// Writes each digest as a MIME message into an outbox directory.
///
/// Used for offline runs; a mail relay or `sendmail` can pick the files up.
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    outbox_dir: PathBuf,
}

impl OutboxNotifier {
    pub fn new(outbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            outbox_dir: outbox_dir.into(),
        }
    }

    /// File name for a digest, unique per second.
    fn file_name(digest: &Digest) -> String {
        format!("digest-{}.eml", digest.generated_at.format("%Y%m%d-%H%M%S"))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.outbox_dir).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn deliver(&self, digest: &Digest, recipient: &Recipient) -> Result<DeliveryReceipt> {
        let path = self.outbox_dir.join(Self::file_name(digest));
        let message = compose(digest, recipient)?;

        self.write_bytes(&path, &message.formatted())
            .await
            .map_err(|e| AppError::delivery(format!("{}: {}", path.display(), e)))?;

        log::info!(
            "Digest for {} written to {}",
            recipient.address,
            path.display()
        );

        Ok(DeliveryReceipt {
            recipient: recipient.address.clone(),
            location: path.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn digest() -> Digest {
        Digest {
            subject: "Daily Fresher Jobs (India) – 2026-03-14".to_string(),
            html: "<p>No matching fresher jobs found today.</p>".to_string(),
            posting_count: 0,
            generated_at: Local.with_ymd_and_hms(2026, 3, 14, 7, 30, 0).unwrap(),
        }
    }

    fn recipient() -> Recipient {
        Recipient {
            sender: "bot@example.com".to_string(),
            address: "me@example.com".to_string(),
        }
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_recipient_defaults_to_sender() {
        let vars = env(&[("GMAIL_SENDER", "bot@example.com")]);
        let r = Recipient::resolve(&NotifierConfig::default(), |k| vars.get(k).cloned()).unwrap();
        assert_eq!(r.address, "bot@example.com");
    }

    #[test]
    fn test_recipient_override() {
        let vars = env(&[
            ("GMAIL_SENDER", "bot@example.com"),
            ("RECIPIENT", "me@example.com"),
        ]);
        let r = Recipient::resolve(&NotifierConfig::default(), |k| vars.get(k).cloned()).unwrap();
        assert_eq!(r, recipient());
    }

    #[test]
    fn test_missing_sender_is_delivery_error() {
        let vars = env(&[("RECIPIENT", "me@example.com"), ("GMAIL_SENDER", " ")]);
        let result = Recipient::resolve(&NotifierConfig::default(), |k| vars.get(k).cloned());
        assert!(matches!(result, Err(AppError::Delivery(_))));
    }

    fn header_block(message: &Message) -> String {
        let formatted = String::from_utf8(message.formatted()).unwrap();
        formatted.split("\r\n\r\n").next().unwrap().to_string()
    }

    #[test]
    fn test_compose_headers() {
        let message = compose(&digest(), &recipient()).unwrap();
        let headers = header_block(&message);
        assert!(headers.contains("From: bot@example.com\r\n"));
        assert!(headers.contains("To: me@example.com\r\n"));
        assert!(headers.contains("Content-Type: text/html; charset=utf-8"));
    }

    #[test]
    fn test_non_ascii_subject_is_encoded() {
        let message = compose(&digest(), &recipient()).unwrap();
        let headers = header_block(&message);
        assert!(headers.is_ascii());
        assert!(headers.to_lowercase().contains("=?utf-8?"));
        assert!(!headers.contains('–'));
    }

    #[test]
    fn test_invalid_address_is_delivery_error() {
        let bad = Recipient {
            address: "not an address".to_string(),
            ..recipient()
        };
        assert!(matches!(
            compose(&digest(), &bad),
            Err(AppError::Delivery(_))
        ));
    }

    #[test]
    fn test_smtp_requires_password() {
        let vars = env(&[("GMAIL_APP_PASSWORD", "  ")]);
        let result = SmtpNotifier::resolve(&NotifierConfig::default(), "bot@example.com", |k| {
            vars.get(k).cloned()
        });
        assert!(matches!(result, Err(AppError::Delivery(_))));
    }

    #[tokio::test]
    async fn test_deliver_writes_message() {
        let tmp = TempDir::new().unwrap();
        let notifier = OutboxNotifier::new(tmp.path().join("outbox"));

        let receipt = notifier.deliver(&digest(), &recipient()).await.unwrap();
        assert_eq!(receipt.recipient, "me@example.com");

        let path = tmp.path().join("outbox/digest-20260314-073000.eml");
        assert_eq!(receipt.location, path.display().to_string());
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("To: me@example.com\r\n"));
        assert!(written.contains("<p>No matching fresher jobs found today.</p>"));
        assert!(!path.with_extension("tmp").exists());
    }
}
