//! Exhibitor entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Exhibitor {
    pub id: i64,
    pub user_id: i64,
    pub company: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub registry_document_url: Option<String>,
    pub pledge_document_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExhibitorRequest {
    pub user_id: i64,
    pub company: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
}

/// Compliance document slots an exhibitor can attach a URL to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Registry,
    Pledge,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Registry => "registry",
            DocumentKind::Pledge => "pledge",
        }
    }
}
