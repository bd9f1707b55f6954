//! Event repository for database operations.

use crate::entities::{CreateEventRequest, Event, EventStatus};
use crate::types::DatabaseResult;
use sqlx::SqlitePool;

const EVENT_COLUMNS: &str = "id, organizer_id, name, description, status, starts_on, ends_on, \
     application_closed_at, application_closed_by, created_at";

/// Repository for event database operations
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new event. Events start in `pending` until an admin reviews them.
    pub async fn create(&self, request: &CreateEventRequest) -> DatabaseResult<Event> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO events (organizer_id, name, description, status, starts_on, ends_on, created_at)
             VALUES (?, ?, ?, 'pending', ?, ?, ?)",
        )
        .bind(request.organizer_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.starts_on)
        .bind(&request.ends_on)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let event = self
            .find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)?;
        Ok(event)
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    pub async fn list_by_organizer(&self, organizer_id: i64) -> DatabaseResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = ? ORDER BY created_at DESC"
        ))
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Events awaiting an admin decision, oldest first.
    pub async fn list_pending(&self) -> DatabaseResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = 'pending' ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Approved events still accepting applications, as listed in the store portal.
    pub async fn list_open_approved(&self) -> DatabaseResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE status = 'approved' AND application_closed_at IS NULL
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Move a pending event to `approved` or `rejected`. Returns false when
    /// the event is missing or already reviewed.
    pub async fn review(&self, id: i64, status: EventStatus) -> DatabaseResult<bool> {
        let result = sqlx::query("UPDATE events SET status = ? WHERE id = ? AND status = 'pending'")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamp the application-closed marker. The `application_closed_at IS NULL`
    /// guard makes the check-and-set atomic: a second close sees zero rows
    /// affected and reports false without writing anything.
    pub async fn close_applications(
        &self,
        id: i64,
        organizer_id: i64,
        closed_at: &str,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE events SET application_closed_at = ?, application_closed_by = ?
             WHERE id = ? AND application_closed_at IS NULL",
        )
        .bind(closed_at)
        .bind(organizer_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
