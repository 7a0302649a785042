//! Outbound mail — `Mailer` trait plus the SMTP transport used in
//! production (lettre, STARTTLS relay).

use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;
use crate::error::MailError;

/// A fully rendered outbound email.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Transactional email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one email. Returns a transport-level delivery identifier.
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError>;
}

/// SMTP mailer over a TLS relay.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Blocking SMTP round trip; run on the blocking pool from `send`.
    fn send_blocking(config: &SmtpConfig, email: &OutboundEmail) -> Result<String, MailError> {
        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let message = Message::builder()
            .from(
                config
                    .from_address
                    .parse()
                    .map_err(|e| MailError::InvalidAddress {
                        address: config.from_address.clone(),
                        reason: format!("{e}"),
                    })?,
            )
            .to(email.to.parse().map_err(|e| MailError::InvalidAddress {
                address: email.to.clone(),
                reason: format!("{e}"),
            })?)
            .subject(&email.subject)
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(|e| MailError::Build(e.to_string()))?;

        let response = transport
            .send(&message)
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(response.code().to_string())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError> {
        let config = self.config.clone();
        let email = email.clone();
        tokio::task::spawn_blocking(move || Self::send_blocking(&config, &email))
            .await
            .map_err(|e| MailError::Transport(format!("send task failed: {e}")))?
    }
}
