use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    clients::mailer::Mailer,
    config::Config,
    models::mail::{MailMessage, SendReceipt},
};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| anyhow!("Invalid SMTP relay '{}': {}", config.smtp_host, e))?
            .port(config.smtp_port);

        match config.smtp_credentials() {
            Some((user, password)) => {
                builder = builder
                    .credentials(Credentials::new(user.to_string(), password.to_string()));
            }
            None => {
                warn!(
                    host = %config.smtp_host,
                    "SMTP credentials not configured, sends will be unauthenticated"
                );
            }
        }

        info!(host = %config.smtp_host, port = config.smtp_port, "SMTP client initialized");

        Ok(Self {
            transport: builder.build(),
            host: config.smtp_host.clone(),
        })
    }

    fn build_message(message: &MailMessage, message_id: &str) -> Result<Message, Error> {
        let from_address: Address = message
            .from
            .email
            .parse()
            .map_err(|e| anyhow!("Invalid sender address '{}': {}", message.from.email, e))?;

        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| anyhow!("Invalid recipient '{}': {}", message.to, e))?;

        Message::builder()
            .from(Mailbox::new(Some(message.from.name.clone()), from_address))
            .to(to)
            .subject(message.subject.as_str())
            .message_id(Some(message_id.to_string()))
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| anyhow!("Failed to build email: {}", e))
    }

    fn message_id_domain(sender: &str) -> &str {
        sender.rsplit_once('@').map(|(_, domain)| domain).unwrap_or("localhost")
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send_mail(&self, message: &MailMessage) -> Result<SendReceipt, Error> {
        let message_id = format!(
            "<{}@{}>",
            Uuid::new_v4(),
            Self::message_id_domain(&message.from.email)
        );
        let email = Self::build_message(message, &message_id)?;

        debug!(to = %message.to, host = %self.host, "Sending email via SMTP");

        self.transport
            .send(email)
            .await
            .map_err(|e| anyhow!("SMTP send failed: {}", e))?;

        Ok(SendReceipt { message_id })
    }

    async fn verify(&self) -> Result<(), Error> {
        let connected = self
            .transport
            .test_connection()
            .await
            .map_err(|e| anyhow!("SMTP connection check failed: {}", e))?;

        if connected {
            Ok(())
        } else {
            Err(anyhow!("SMTP server {} did not accept the connection", self.host))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mail::Sender;

    fn message(to: &str) -> MailMessage {
        MailMessage {
            from: Sender {
                email: "noreply@crimereport.local".to_string(),
                name: "Crime Reporting System".to_string(),
            },
            to: to.to_string(),
            subject: "Case Status Updated - FIR-1".to_string(),
            html: "<p>Updated</p>".to_string(),
        }
    }

    #[test]
    fn test_build_message_carries_message_id() {
        let email = SmtpMailer::build_message(
            &message("citizen@example.com"),
            "<abc@crimereport.local>",
        )
        .expect("valid message");
        let formatted = String::from_utf8(email.formatted()).expect("utf-8 message");

        assert!(formatted.contains("Message-ID: <abc@crimereport.local>"));
        assert!(formatted.contains("To: citizen@example.com"));
        assert!(formatted.contains("Content-Type: text/html"));
    }

    #[test]
    fn test_build_message_rejects_invalid_addresses() {
        assert!(SmtpMailer::build_message(&message("not-an-address"), "<id@x>").is_err());

        let mut bad_sender = message("citizen@example.com");
        bad_sender.from.email = "not-an-address".to_string();
        assert!(SmtpMailer::build_message(&bad_sender, "<id@x>").is_err());
    }

    #[test]
    fn test_message_id_domain() {
        assert_eq!(
            SmtpMailer::message_id_domain("noreply@crimereport.local"),
            "crimereport.local"
        );
        assert_eq!(SmtpMailer::message_id_domain("no-domain"), "localhost");
    }
}
