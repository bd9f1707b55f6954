//! Notification fan-out helpers. Writes are best-effort: a failed insert is
//! logged and never aborts the flow that triggered it.

use expodesk_database::{CreateNotificationRequest, NotificationRepository, UserType};
use sqlx::SqlitePool;
use tracing::warn;

pub async fn notify(
    pool: &SqlitePool,
    user_id: i64,
    user_type: UserType,
    notification_type: &str,
    title: &str,
    message: &str,
) {
    let request = CreateNotificationRequest {
        user_id,
        user_type,
        notification_type: notification_type.to_string(),
        title: title.to_string(),
        message: message.to_string(),
    };

    if let Err(err) = NotificationRepository::new(pool.clone()).create(&request).await {
        warn!(error = %err, user_id, notification_type, "failed to record notification");
    }
}

/// Notify every admin account.
pub async fn notify_admins(pool: &SqlitePool, notification_type: &str, title: &str, message: &str) {
    let admin_ids: Vec<i64> =
        match sqlx::query_scalar("SELECT id FROM users WHERE role = 'admin'")
            .fetch_all(pool)
            .await
        {
            Ok(ids) => ids,
            Err(err) => {
                warn!(error = %err, "failed to enumerate admins for notification");
                return;
            }
        };

    for admin_id in admin_ids {
        notify(pool, admin_id, UserType::Admin, notification_type, title, message).await;
    }
}
