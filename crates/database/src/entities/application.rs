//! Application entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub exhibitor_id: i64,
    pub event_id: i64,
    pub status: ApplicationStatus,
    pub applied_at: String,
    pub reviewed_at: Option<String>,
}

/// An application joined with the exhibitor that submitted it. This is the
/// record shape the export and closing flows hand around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApplicationWithExhibitor {
    pub id: i64,
    pub exhibitor_id: i64,
    pub event_id: i64,
    pub status: ApplicationStatus,
    pub applied_at: String,
    pub reviewed_at: Option<String>,
    pub company: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
}

/// An application joined with its event, as shown in the store portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApplicationWithEvent {
    pub id: i64,
    pub event_id: i64,
    pub event_name: String,
    pub status: ApplicationStatus,
    pub applied_at: String,
}
