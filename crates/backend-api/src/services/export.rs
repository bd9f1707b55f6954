//! CSV rendering for applicant exports.
//!
//! The output targets spreadsheet tools used by the organizers: UTF-8 with a
//! BOM so Excel detects the encoding, every field quoted, Japanese headers,
//! and status codes localized.

use chrono::{DateTime, FixedOffset};
use expodesk_database::{ApplicationStatus, ApplicationWithExhibitor};

use super::error::ServiceError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_HEADERS: [&str; 7] = [
    "申込ID",
    "会社名",
    "担当者名",
    "メールアドレス",
    "電話番号",
    "申込日時",
    "ステータス",
];

pub fn status_label(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "審査中",
        ApplicationStatus::Approved => "承認済み",
        ApplicationStatus::Rejected => "却下",
    }
}

/// Timestamps are stored as RFC 3339 UTC; render them in JST for the sheet.
/// A value that does not parse is passed through untouched.
fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => {
            let jst = FixedOffset::east_opt(9 * 3600).expect("valid JST offset");
            parsed.with_timezone(&jst).format("%Y/%m/%d %H:%M").to_string()
        }
        Err(_) => raw.to_string(),
    }
}

/// Render the applicant list as a BOM-prefixed CSV document.
pub fn render_applicants_csv(
    applications: &[ApplicationWithExhibitor],
) -> Result<Vec<u8>, ServiceError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;

    for application in applications {
        writer.write_record([
            application.id.to_string(),
            application.company.clone(),
            application.contact_name.clone(),
            application.email.clone(),
            application.phone.clone(),
            format_timestamp(&application.applied_at),
            status_label(application.status).to_string(),
        ])?;
    }

    let data = writer
        .into_inner()
        .map_err(|err| ServiceError::internal(format!("csv rendering failed: {err}")))?;

    let mut body = Vec::with_capacity(UTF8_BOM.len() + data.len());
    body.extend_from_slice(UTF8_BOM);
    body.extend_from_slice(&data);
    Ok(body)
}
