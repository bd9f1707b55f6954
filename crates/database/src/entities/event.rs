//! Event entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub organizer_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub starts_on: Option<String>,
    pub ends_on: Option<String>,
    pub application_closed_at: Option<String>,
    pub application_closed_by: Option<i64>,
    pub created_at: String,
}

impl Event {
    pub fn applications_closed(&self) -> bool {
        self.application_closed_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub organizer_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub starts_on: Option<String>,
    pub ends_on: Option<String>,
}
