use std::sync::Arc;

use anyhow::{Error, Result};
use async_trait::async_trait;
use tracing::info;

use crate::{
    clients::{api_mailer::ApiMailer, smtp::SmtpMailer},
    config::Config,
    models::mail::{MailMessage, SendReceipt},
};

/// An outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send_mail(&self, message: &MailMessage) -> Result<SendReceipt, Error>;

    /// Connectivity check run once at startup.
    async fn verify(&self) -> Result<(), Error>;
}

/// Picks the mail API transport when a token is configured, SMTP otherwise.
pub fn select_transport(config: &Config) -> Result<Arc<dyn Mailer>, Error> {
    if let Some(token) = config.mail_api_token() {
        info!(url = %config.mail_api_url, "Using mail API transport");
        return Ok(Arc::new(ApiMailer::new(&config.mail_api_url, token)?));
    }

    info!(
        host = %config.smtp_host,
        port = config.smtp_port,
        "Using SMTP transport"
    );
    Ok(Arc::new(SmtpMailer::new(config)?))
}
