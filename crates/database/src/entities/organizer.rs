//! Organizer entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organizer {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub approved: bool,
    pub approved_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganizerRequest {
    pub user_id: i64,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}
