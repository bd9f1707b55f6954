//! Organizer repository for database operations.

use crate::entities::{CreateOrganizerRequest, Organizer};
use crate::types::DatabaseResult;
use sqlx::SqlitePool;

const ORGANIZER_COLUMNS: &str =
    "id, user_id, name, company, email, phone, approved, approved_at, created_at";

/// Repository for organizer database operations
pub struct OrganizerRepository {
    pool: SqlitePool,
}

impl OrganizerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new organizer profile. The profile starts unapproved.
    pub async fn create(&self, request: &CreateOrganizerRequest) -> DatabaseResult<Organizer> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO organizers (user_id, name, company, email, phone, approved, created_at)
             VALUES (?, ?, ?, ?, ?, FALSE, ?)",
        )
        .bind(request.user_id)
        .bind(&request.name)
        .bind(&request.company)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let organizer = self
            .find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)?;
        Ok(organizer)
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Organizer>> {
        let organizer = sqlx::query_as::<_, Organizer>(&format!(
            "SELECT {ORGANIZER_COLUMNS} FROM organizers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organizer)
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> DatabaseResult<Option<Organizer>> {
        let organizer = sqlx::query_as::<_, Organizer>(&format!(
            "SELECT {ORGANIZER_COLUMNS} FROM organizers WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organizer)
    }

    /// Organizers still waiting for an admin decision, oldest first.
    pub async fn list_pending(&self) -> DatabaseResult<Vec<Organizer>> {
        let organizers = sqlx::query_as::<_, Organizer>(&format!(
            "SELECT {ORGANIZER_COLUMNS} FROM organizers WHERE approved = FALSE ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(organizers)
    }

    /// Flip the approval flag. Returns false when no organizer row matched.
    /// Re-approving keeps the original approval timestamp.
    pub async fn approve(&self, id: i64) -> DatabaseResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE organizers SET approved = TRUE, approved_at = COALESCE(approved_at, ?) WHERE id = ?",
        )
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
