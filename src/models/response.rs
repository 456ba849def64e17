use serde::Serialize;

use crate::models::retry::QueueStatus;

/// Result of one dispatch attempt. Transport errors never escape as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { message_id: String },
    Queued { error: String },
    Failed { error: String },
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, DispatchOutcome::Queued { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub queued: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl NotificationResponse {
    pub fn sent(message_id: String) -> Self {
        Self {
            success: true,
            message_id: Some(message_id),
            queued: None,
            message: None,
            error: None,
            template: None,
        }
    }

    pub fn queued() -> Self {
        Self {
            success: true,
            message_id: None,
            queued: Some(true),
            message: Some("Email delivery failed, queued for retry".to_string()),
            error: None,
            template: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            message_id: None,
            queued: None,
            message: None,
            error: Some(error),
            template: None,
        }
    }

    pub fn rejected(message: String) -> Self {
        Self {
            success: false,
            message_id: None,
            queued: None,
            message: Some(message),
            error: None,
            template: None,
        }
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.template = Some(template.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusResponse {
    pub success: bool,

    #[serde(flatten)]
    pub status: QueueStatus,
}
