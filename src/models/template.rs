use std::fmt::{Display, Formatter, Result};

use crate::models::notification::NotificationData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    FirFiled,
    MissingPersonFiled,
    MissingPersonUpdate,
    MissingPersonReassigned,
    FirUpdate,
    StatusUpdate,
    Generic,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 7] = [
        TemplateKind::FirFiled,
        TemplateKind::MissingPersonFiled,
        TemplateKind::MissingPersonUpdate,
        TemplateKind::MissingPersonReassigned,
        TemplateKind::FirUpdate,
        TemplateKind::StatusUpdate,
        TemplateKind::Generic,
    ];

    /// Unknown names fall back to the generic template.
    pub fn from_name(name: &str) -> Self {
        match name {
            "firFiled" => TemplateKind::FirFiled,
            "missingPersonFiled" => TemplateKind::MissingPersonFiled,
            "missingPersonUpdate" => TemplateKind::MissingPersonUpdate,
            "missingPersonReassigned" => TemplateKind::MissingPersonReassigned,
            "firUpdate" => TemplateKind::FirUpdate,
            "statusUpdate" => TemplateKind::StatusUpdate,
            _ => TemplateKind::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::FirFiled => "firFiled",
            TemplateKind::MissingPersonFiled => "missingPersonFiled",
            TemplateKind::MissingPersonUpdate => "missingPersonUpdate",
            TemplateKind::MissingPersonReassigned => "missingPersonReassigned",
            TemplateKind::FirUpdate => "firUpdate",
            TemplateKind::StatusUpdate => "statusUpdate",
            TemplateKind::Generic => "generic",
        }
    }
}

impl Display for TemplateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirFiled {
    pub fir_number: Option<String>,
    pub authority_name: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingPersonFiled {
    pub case_number: Option<String>,
    pub status: Option<String>,
    pub missing_person_name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub height: Option<String>,
    pub complexion: Option<String>,
    pub last_seen_date: Option<String>,
    pub last_seen_location: Option<String>,
    pub description: Option<String>,
    pub authority_name: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingPersonUpdate {
    pub case_number: Option<String>,
    pub missing_person_name: Option<String>,
    pub update_type: Option<String>,
    pub previous_status: Option<String>,
    pub new_status: Option<String>,
    pub comment: Option<String>,
    pub authority_name: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingPersonReassigned {
    pub case_number: Option<String>,
    pub missing_person_name: Option<String>,
    pub status: Option<String>,
    pub new_authority_name: Option<String>,
    pub previous_authority_name: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirUpdate {
    pub fir_number: Option<String>,
    pub update_type: Option<String>,
    pub new_status: Option<String>,
    pub previous_status: Option<String>,
    pub authority_name: Option<String>,
    pub comment: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub reference: Option<String>,
    pub new_status: Option<String>,
    pub authority_name: Option<String>,
    pub comment: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generic {
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// The fields one template kind actually renders.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateData {
    FirFiled(FirFiled),
    MissingPersonFiled(MissingPersonFiled),
    MissingPersonUpdate(MissingPersonUpdate),
    MissingPersonReassigned(MissingPersonReassigned),
    FirUpdate(FirUpdate),
    StatusUpdate(StatusUpdate),
    Generic(Generic),
}

impl TemplateData {
    pub fn new(kind: TemplateKind, data: NotificationData) -> Self {
        // FIR templates accept either the FIR number or the generic reference.
        let fir_number = data.fir_number.or_else(|| data.reference.clone());

        match kind {
            TemplateKind::FirFiled => TemplateData::FirFiled(FirFiled {
                fir_number,
                authority_name: data.authority_name,
                timestamp: data.timestamp,
            }),
            TemplateKind::MissingPersonFiled => {
                TemplateData::MissingPersonFiled(MissingPersonFiled {
                    case_number: data.case_number,
                    status: data.status,
                    missing_person_name: data.missing_person_name,
                    age: data.age,
                    gender: data.gender,
                    height: data.height,
                    complexion: data.complexion,
                    last_seen_date: data.last_seen_date,
                    last_seen_location: data.last_seen_location,
                    description: data.description,
                    authority_name: data.authority_name,
                    timestamp: data.timestamp,
                })
            }
            TemplateKind::MissingPersonUpdate => {
                TemplateData::MissingPersonUpdate(MissingPersonUpdate {
                    case_number: data.case_number,
                    missing_person_name: data.missing_person_name,
                    update_type: data.update_type,
                    previous_status: data.previous_status,
                    new_status: data.new_status,
                    comment: data.comment,
                    authority_name: data.authority_name,
                    timestamp: data.timestamp,
                })
            }
            TemplateKind::MissingPersonReassigned => {
                TemplateData::MissingPersonReassigned(MissingPersonReassigned {
                    case_number: data.case_number,
                    missing_person_name: data.missing_person_name,
                    status: data.status,
                    new_authority_name: data.new_authority_name,
                    previous_authority_name: data.previous_authority_name,
                    timestamp: data.timestamp,
                })
            }
            TemplateKind::FirUpdate => TemplateData::FirUpdate(FirUpdate {
                fir_number,
                update_type: data.update_type,
                new_status: data.new_status,
                previous_status: data.previous_status,
                authority_name: data.authority_name,
                comment: data.comment,
                timestamp: data.timestamp,
            }),
            TemplateKind::StatusUpdate => TemplateData::StatusUpdate(StatusUpdate {
                reference: data.reference.or(data.case_number).or(fir_number),
                new_status: data.new_status.or(data.status),
                authority_name: data.authority_name,
                comment: data.comment,
                timestamp: data.timestamp,
            }),
            TemplateKind::Generic => TemplateData::Generic(Generic {
                subject: data.subject,
                message: data.message,
            }),
        }
    }

    pub fn kind(&self) -> TemplateKind {
        match self {
            TemplateData::FirFiled(_) => TemplateKind::FirFiled,
            TemplateData::MissingPersonFiled(_) => TemplateKind::MissingPersonFiled,
            TemplateData::MissingPersonUpdate(_) => TemplateKind::MissingPersonUpdate,
            TemplateData::MissingPersonReassigned(_) => TemplateKind::MissingPersonReassigned,
            TemplateData::FirUpdate(_) => TemplateKind::FirUpdate,
            TemplateData::StatusUpdate(_) => TemplateKind::StatusUpdate,
            TemplateData::Generic(_) => TemplateKind::Generic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}
