use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthCheckResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
            service: "notification-service".to_string(),
            timestamp: Utc::now(),
        }
    }
}
