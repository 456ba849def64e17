use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::time::Duration;

use crate::models::template::TemplateData;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub sweep_interval_ms: u64,
}

impl RetryConfig {
    /// Saturates at `TimeDelta::MAX` for delays chrono cannot represent.
    pub fn retry_delay(&self) -> TimeDelta {
        i64::try_from(self.retry_delay_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 5_000,
            sweep_interval_ms: 10_000,
        }
    }
}

/// A failed send waiting for redelivery.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryRecord {
    pub recipient: String,
    pub template: TemplateData,
    pub attempt_count: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl RetryRecord {
    pub fn is_ready(&self, now: DateTime<Utc>, delay: TimeDelta) -> bool {
        now - self.enqueued_at >= delay
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub to: String,
    pub template: String,
    pub retry_count: u32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub queue_length: usize,
    pub items: Vec<QueueItem>,
}

/// What a single sweep tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub ready: usize,
    pub delivered: usize,
    pub requeued: usize,
    pub dropped: usize,
}
