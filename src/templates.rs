//! HTML email bodies for every notification kind.
//!
//! The layout and one body per kind are embedded at compile time and
//! registered with tera under `.html` names, so every interpolated value is
//! HTML-escaped by the engine. Rendering is pure: the only input besides the
//! template data is the fallback time used when a notification carries no
//! timestamp.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use tera::{Context, Tera};
use tracing::error;

use crate::models::template::{RenderedEmail, TemplateData};

const NOT_AVAILABLE: &str = "N/A";
const PENDING_ASSIGNMENT: &str = "Pending Assignment";
const DEFAULT_SUBJECT: &str = "Notification from Crime Reporting System";
const DEFAULT_MESSAGE: &str = "You have a new notification.";

/// Sent when the engine itself is broken; carries no caller data.
const FALLBACK_HTML: &str = "<!DOCTYPE html><html><body>\
    <p>You have a new notification from the Crime Reporting System.</p>\
    </body></html>";

static ENGINE: LazyLock<Tera> = LazyLock::new(build_engine);

fn build_engine() -> Tera {
    let mut engine = Tera::default();

    let registered = engine.add_raw_templates(vec![
        ("layout.html", include_str!("../templates/emails/layout.html")),
        ("fir_filed.html", include_str!("../templates/emails/fir_filed.html")),
        (
            "missing_person_filed.html",
            include_str!("../templates/emails/missing_person_filed.html"),
        ),
        (
            "missing_person_update.html",
            include_str!("../templates/emails/missing_person_update.html"),
        ),
        (
            "missing_person_reassigned.html",
            include_str!("../templates/emails/missing_person_reassigned.html"),
        ),
        ("fir_update.html", include_str!("../templates/emails/fir_update.html")),
        (
            "status_update.html",
            include_str!("../templates/emails/status_update.html"),
        ),
        ("generic.html", include_str!("../templates/emails/generic.html")),
    ]);

    if let Err(e) = registered {
        error!(error = %e, "Failed to register email templates");
    }

    engine
}

/// Names of the templates the engine loaded.
pub fn template_names() -> Vec<String> {
    let mut names: Vec<String> = ENGINE.get_template_names().map(str::to_string).collect();
    names.sort();
    names
}

pub fn render(data: &TemplateData) -> RenderedEmail {
    render_at(data, Utc::now())
}

pub fn render_at(data: &TemplateData, now: DateTime<Utc>) -> RenderedEmail {
    let (template_name, subject, context) = build_template_params(data, now);

    let html = match ENGINE.render(template_name, &context) {
        Ok(html) => html,
        Err(e) => {
            error!(template = template_name, error = %e, "Email template render failed");
            FALLBACK_HTML.to_string()
        }
    };

    RenderedEmail { subject, html }
}

fn build_template_params(
    data: &TemplateData,
    now: DateTime<Utc>,
) -> (&'static str, String, Context) {
    let mut context = Context::new();

    let (template_name, heading, subject) = match data {
        TemplateData::FirFiled(d) => {
            let fir = or_na(&d.fir_number);
            context.insert("fir_number", fir);
            context.insert("authority_name", or(&d.authority_name, PENDING_ASSIGNMENT));
            context.insert("timestamp", &timestamp(&d.timestamp, now));

            (
                "fir_filed.html",
                "FIR Filed Successfully".to_string(),
                format!("FIR Filed Successfully - {fir}"),
            )
        }
        TemplateData::MissingPersonFiled(d) => {
            let case_number = or_na(&d.case_number);
            context.insert("case_number", case_number);
            context.insert("status", or(&d.status, "Under Investigation"));
            context.insert("authority_name", or(&d.authority_name, PENDING_ASSIGNMENT));
            context.insert("timestamp", &timestamp(&d.timestamp, now));
            context.insert("missing_person_name", or_na(&d.missing_person_name));
            context.insert("age", or_na(&d.age));
            context.insert("gender", or_na(&d.gender));
            context.insert("height", or_na(&d.height));
            context.insert("complexion", or_na(&d.complexion));
            context.insert("last_seen_date", or_na(&d.last_seen_date));
            context.insert("last_seen_location", or_na(&d.last_seen_location));
            context.insert("description", or_na(&d.description));

            (
                "missing_person_filed.html",
                "Missing Person Report Filed".to_string(),
                format!("Missing Person Report Filed - {case_number}"),
            )
        }
        TemplateData::MissingPersonUpdate(d) => {
            let case_number = or_na(&d.case_number);
            context.insert("case_number", case_number);
            context.insert("missing_person_name", or_na(&d.missing_person_name));
            context.insert("update_type", or(&d.update_type, "Update"));
            context.insert("previous_status", or_na(&d.previous_status));
            context.insert("new_status", or_na(&d.new_status));
            context.insert("authority_name", or(&d.authority_name, PENDING_ASSIGNMENT));
            context.insert("timestamp", &timestamp(&d.timestamp, now));
            context.insert("comment", &present(&d.comment));

            (
                "missing_person_update.html",
                "Missing Person Case Update".to_string(),
                format!("Missing Person Case Update - {case_number}"),
            )
        }
        TemplateData::MissingPersonReassigned(d) => {
            let case_number = or_na(&d.case_number);
            context.insert("case_number", case_number);
            context.insert("missing_person_name", or_na(&d.missing_person_name));
            context.insert("status", or_na(&d.status));
            context.insert("previous_authority_name", or_na(&d.previous_authority_name));
            context.insert(
                "new_authority_name",
                or(&d.new_authority_name, PENDING_ASSIGNMENT),
            );
            context.insert("timestamp", &timestamp(&d.timestamp, now));

            (
                "missing_person_reassigned.html",
                "Case Reassigned".to_string(),
                format!("Missing Person Case Reassigned - {case_number}"),
            )
        }
        TemplateData::FirUpdate(d) => {
            let fir = or_na(&d.fir_number);
            context.insert("fir_number", fir);
            context.insert("update_type", or(&d.update_type, "Update"));
            context.insert("previous_status", or_na(&d.previous_status));
            context.insert("new_status", or_na(&d.new_status));
            context.insert("authority_name", or(&d.authority_name, PENDING_ASSIGNMENT));
            context.insert("timestamp", &timestamp(&d.timestamp, now));
            context.insert("comment", &present(&d.comment));

            (
                "fir_update.html",
                "FIR Update".to_string(),
                format!("FIR Updated - {fir}"),
            )
        }
        TemplateData::StatusUpdate(d) => {
            let reference = or_na(&d.reference);
            context.insert("reference", reference);
            context.insert("new_status", or_na(&d.new_status));
            context.insert("authority_name", or(&d.authority_name, PENDING_ASSIGNMENT));
            context.insert("timestamp", &timestamp(&d.timestamp, now));
            context.insert("comment", &present(&d.comment));

            (
                "status_update.html",
                "Case Status Updated".to_string(),
                format!("Case Status Updated - {reference}"),
            )
        }
        TemplateData::Generic(d) => {
            let subject = or(&d.subject, DEFAULT_SUBJECT);
            context.insert("message", or(&d.message, DEFAULT_MESSAGE));

            ("generic.html", subject.to_string(), subject.to_string())
        }
    };

    context.insert("heading", &heading);

    (template_name, subject, context)
}

fn timestamp(value: &Option<String>, now: DateTime<Utc>) -> String {
    match present(value) {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => format_time(parsed.with_timezone(&Utc)),
            Err(_) => raw.to_string(),
        },
        None => format_time(now),
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%B %d, %Y at %H:%M UTC").to_string()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    present(value).unwrap_or(fallback)
}

fn or_na(value: &Option<String>) -> &str {
    or(value, NOT_AVAILABLE)
}
