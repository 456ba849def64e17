use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    clients::mailer::Mailer,
    models::mail::{MailMessage, SendReceipt},
};

/// Sends mail through an HTTP email API authenticated with a bearer token.
pub struct ApiMailer {
    http_client: Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct ApiAddress<'a> {
    email: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ApiSendRequest<'a> {
    from: ApiAddress<'a>,
    to: Vec<ApiAddress<'a>>,
    subject: &'a str,
    html: &'a str,
    category: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiSendResponse {
    message_ids: Vec<String>,
    id: Option<String>,
    #[serde(rename = "messageId")]
    message_id: Option<String>,
}

impl ApiSendResponse {
    fn into_message_id(self) -> Option<String> {
        self.message_ids
            .into_iter()
            .next()
            .or(self.message_id)
            .or(self.id)
    }
}

impl ApiMailer {
    pub fn new(api_url: &str, token: &str) -> Result<Self, Error> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        info!(api_url, "Mail API client initialized");

        Ok(Self {
            http_client,
            api_url: api_url.to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ApiMailer {
    fn name(&self) -> &'static str {
        "mail_api"
    }

    async fn send_mail(&self, message: &MailMessage) -> Result<SendReceipt, Error> {
        debug!(to = %message.to, subject = %message.subject, "Sending email via mail API");

        let request = ApiSendRequest {
            from: ApiAddress {
                email: &message.from.email,
                name: Some(&message.from.name),
            },
            to: vec![ApiAddress {
                email: &message.to,
                name: None,
            }],
            subject: &message.subject,
            html: &message.html,
            category: "notification",
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Mail API request failed: {}", e))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Mail API returned {}: {}", status, error_text));
        }

        // Providers differ in how they report ids; an unreadable body still counts as sent.
        let body: ApiSendResponse = response.json().await.unwrap_or_default();
        let message_id = body
            .into_message_id()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(SendReceipt { message_id })
    }

    async fn verify(&self) -> Result<(), Error> {
        if self.token.trim().is_empty() {
            return Err(anyhow!("Mail API token is empty"));
        }

        debug!(api_url = %self.api_url, "Mail API transport ready");
        Ok(())
    }
}
