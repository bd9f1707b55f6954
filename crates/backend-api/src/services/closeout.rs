//! The close-and-export sequence.
//!
//! Three steps run in order: close the application window, render the CSV,
//! email the organizer. The first two are required and abort the sequence
//! with their own error; the email is advisory and only downgrades the
//! outcome. There are no retries and no compensation — a close followed by a
//! failed export leaves the event closed.

use expodesk_database::{ApplicationWithExhibitor, Organizer};
use expodesk_mailer::Mailer;
use sqlx::SqlitePool;
use tracing::warn;

use super::{error::ServiceError, events, export};

/// Outcome of the advisory email step.
#[derive(Debug, Clone)]
pub enum EmailStep {
    /// Delivered through the provider.
    Sent { provider_id: Option<String> },
    /// Provider not configured; the message was logged instead.
    Skipped,
    /// Dispatch failed; the overall sequence still succeeds.
    Failed { message: String },
}

impl EmailStep {
    pub fn succeeded(&self) -> bool {
        !matches!(self, EmailStep::Failed { .. })
    }
}

pub struct CloseoutOutcome {
    pub closed_at: String,
    pub applications: Vec<ApplicationWithExhibitor>,
    pub csv: Vec<u8>,
    pub email: EmailStep,
}

pub async fn close_and_export(
    pool: &SqlitePool,
    mailer: &Mailer,
    organizer: &Organizer,
    event_id: i64,
) -> Result<CloseoutOutcome, ServiceError> {
    let closed = events::close_applications(pool, organizer, event_id).await?;

    let csv = export::render_applicants_csv(&closed.applications)?;

    let subject = format!("{} の申込受付を締め切りました", closed.event.name);
    let html = format!(
        "<p>{} の申込受付を締め切りました。</p><p>申込件数: {}件</p>",
        closed.event.name,
        closed.applications.len()
    );

    let email = match mailer.send(&organizer.email, &subject, &html).await {
        Ok(dispatch) if dispatch.delivered => EmailStep::Sent {
            provider_id: dispatch.provider_id,
        },
        Ok(_) => EmailStep::Skipped,
        Err(err) => {
            warn!(error = %err, event_id, "closeout email failed");
            EmailStep::Failed {
                message: err.to_string(),
            }
        }
    };

    Ok(CloseoutOutcome {
        closed_at: closed.closed_at,
        applications: closed.applications,
        csv,
        email,
    })
}
