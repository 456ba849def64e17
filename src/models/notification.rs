use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::models::template::TemplateKind;

/// Loosely shaped notification fields as they arrive from other services.
///
/// Every field is optional; each template picks the subset it displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationData {
    #[serde(deserialize_with = "loose_string")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub message: Option<String>,

    #[serde(deserialize_with = "loose_string")]
    pub fir_number: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub reference: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub case_number: Option<String>,

    #[serde(deserialize_with = "loose_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub update_type: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub previous_status: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub new_status: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub comment: Option<String>,

    #[serde(deserialize_with = "loose_string")]
    pub authority_name: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub new_authority_name: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub previous_authority_name: Option<String>,

    #[serde(deserialize_with = "loose_string")]
    pub missing_person_name: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub age: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub height: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub complexion: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub last_seen_date: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub last_seen_location: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub description: Option<String>,

    #[serde(deserialize_with = "loose_string")]
    pub timestamp: Option<String>,
}

/// Body of `POST /api/notify`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyRequest {
    #[serde(deserialize_with = "loose_string")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub template: Option<String>,

    #[serde(flatten)]
    pub data: NotificationData,
}

impl NotifyRequest {
    /// The explicit address, or a placeholder derived from the user id.
    pub fn recipient(&self) -> Option<String> {
        if let Some(email) = non_blank(&self.email) {
            return Some(email.to_string());
        }

        non_blank(&self.user_id).map(|user_id| format!("user-{}@placeholder.local", user_id))
    }

    pub fn template_kind(&self) -> TemplateKind {
        match non_blank(&self.template) {
            Some(name) => TemplateKind::from_name(name),
            None => detect_template(&self.data),
        }
    }
}

/// Body of `POST /api/send`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendRequest {
    #[serde(deserialize_with = "loose_string")]
    pub to: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub template: Option<String>,
    pub data: NotificationData,
}

impl SendRequest {
    pub fn template_kind(&self) -> TemplateKind {
        non_blank(&self.template)
            .map(TemplateKind::from_name)
            .unwrap_or(TemplateKind::Generic)
    }
}

/// Guesses a template from case-number prefixes and subject wording.
pub fn detect_template(data: &NotificationData) -> TemplateKind {
    let case_number = data.case_number.as_deref().unwrap_or_default();
    let subject = data.subject.as_deref().unwrap_or_default();

    if case_number.starts_with("MP-") || subject.contains("Missing Person") {
        return TemplateKind::MissingPersonFiled;
    }

    if case_number.starts_with("FIR-") || subject.contains("FIR Filed") {
        return TemplateKind::FirFiled;
    }

    if subject.contains("Updated") {
        let fir_reference = non_blank(&data.fir_number).is_some()
            || data
                .reference
                .as_deref()
                .is_some_and(|reference| reference.starts_with("FIR-"));

        return if fir_reference {
            TemplateKind::FirUpdate
        } else {
            TemplateKind::StatusUpdate
        };
    }

    TemplateKind::Generic
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts any scalar JSON value and keeps it as text; `null` becomes `None`.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;

    Ok(match value {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(s),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(JsonValue::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
