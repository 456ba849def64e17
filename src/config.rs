use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::{mail::Sender, retry::RetryConfig};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub mail_api_token: Option<String>,
    #[serde(default = "default_mail_api_url")]
    pub mail_api_url: String,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,

    #[serde(default = "default_sender_email")]
    pub sender_email: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_retry_sweep_interval_ms")]
    pub retry_sweep_interval_ms: u64,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_mail_api_url() -> String {
    "https://send.api.mailtrap.io/api/send".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender_email() -> String {
    "noreply@crimereport.local".to_string()
}

fn default_sender_name() -> String {
    "Crime Reporting System".to_string()
}

fn default_allowed_origins() -> String {
    "http://localhost:3000".to_string()
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5_000
}

fn default_retry_sweep_interval_ms() -> u64 {
    10_000
}

fn default_server_port() -> u16 {
    5001
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mail_api_token: None,
            mail_api_url: default_mail_api_url(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_password: None,
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            allowed_origins: default_allowed_origins(),
            max_retry_attempts: default_max_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_sweep_interval_ms: default_retry_sweep_interval_ms(),
            server_port: default_server_port(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid environment configuration: {}", e))?;
        Ok(config)
    }

    pub fn mail_api_token(&self) -> Option<&str> {
        non_empty(&self.mail_api_token)
    }

    /// Credentials are only used when both user and password are set.
    pub fn smtp_credentials(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.smtp_user)?, non_empty(&self.smtp_password)?))
    }

    pub fn sender(&self) -> Sender {
        Sender {
            email: self.sender_email.clone(),
            name: self.sender_name.clone(),
        }
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retry_attempts,
            retry_delay_ms: self.retry_delay_ms,
            sweep_interval_ms: self.retry_sweep_interval_ms,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
