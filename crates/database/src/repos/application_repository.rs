//! Application repository for database operations.

use crate::entities::{
    Application, ApplicationStatus, ApplicationWithEvent, ApplicationWithExhibitor,
};
use crate::types::DatabaseResult;
use sqlx::SqlitePool;

const APPLICATION_COLUMNS: &str = "id, exhibitor_id, event_id, status, applied_at, reviewed_at";

/// Repository for application database operations
pub struct ApplicationRepository {
    pool: SqlitePool,
}

impl ApplicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Submit an application. One application per exhibitor and event; a
    /// duplicate surfaces as a unique violation.
    pub async fn create(&self, exhibitor_id: i64, event_id: i64) -> DatabaseResult<Application> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO applications (exhibitor_id, event_id, status, applied_at)
             VALUES (?, ?, 'pending', ?)",
        )
        .bind(exhibitor_id)
        .bind(event_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let application = self
            .find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)?;
        Ok(application)
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    /// All applications for an event with the submitting exhibitor joined in,
    /// in submission order. This is the record set the export flow works on.
    pub async fn list_for_event(&self, event_id: i64) -> DatabaseResult<Vec<ApplicationWithExhibitor>> {
        let applications = sqlx::query_as::<_, ApplicationWithExhibitor>(
            "SELECT a.id, a.exhibitor_id, a.event_id, a.status, a.applied_at, a.reviewed_at,
                    x.company, x.contact_name, x.email, x.phone
             FROM applications a
             JOIN exhibitors x ON x.id = a.exhibitor_id
             WHERE a.event_id = ?
             ORDER BY a.applied_at ASC, a.id ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    /// An exhibitor's applications with the event name joined in.
    pub async fn list_for_exhibitor(
        &self,
        exhibitor_id: i64,
    ) -> DatabaseResult<Vec<ApplicationWithEvent>> {
        let applications = sqlx::query_as::<_, ApplicationWithEvent>(
            "SELECT a.id, a.event_id, e.name AS event_name, a.status, a.applied_at
             FROM applications a
             JOIN events e ON e.id = a.event_id
             WHERE a.exhibitor_id = ?
             ORDER BY a.applied_at DESC, a.id DESC",
        )
        .bind(exhibitor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    /// Move a pending application to `approved` or `rejected`. Returns false
    /// when the application is missing or already reviewed.
    pub async fn review(&self, id: i64, status: ApplicationStatus) -> DatabaseResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE applications SET status = ?, reviewed_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(status)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
