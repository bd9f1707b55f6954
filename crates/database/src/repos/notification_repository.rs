//! Notification repository for database operations.

use crate::entities::{CreateNotificationRequest, Notification};
use crate::types::DatabaseResult;
use sqlx::SqlitePool;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, user_type, type, title, message, read, created_at";

/// Repository for notification database operations
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an event for a user. No logic beyond field persistence.
    pub async fn create(&self, request: &CreateNotificationRequest) -> DatabaseResult<Notification> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO notifications (user_id, user_type, type, title, message, read, created_at)
             VALUES (?, ?, ?, ?, ?, FALSE, ?)",
        )
        .bind(request.user_id)
        .bind(request.user_type)
        .bind(&request.notification_type)
        .bind(&request.title)
        .bind(&request.message)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let notification = self
            .find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)?;
        Ok(notification)
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Notification>> {
        let notifications = if unread_only {
            sqlx::query_as::<_, Notification>(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE user_id = ? AND read = FALSE
                 ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Notification>(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE user_id = ?
                 ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: i64) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Mark one notification read. Scoped to the owner; returns false when no
    /// row matched.
    pub async fn mark_read(&self, id: i64, user_id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = ? AND user_id = ? AND read = FALSE",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_read(&self, user_id: i64) -> DatabaseResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = ? AND read = FALSE")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
