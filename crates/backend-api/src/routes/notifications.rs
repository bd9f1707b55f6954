use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use expodesk_database::{Notification, NotificationRepository};
use serde::{Deserialize, Serialize};

use crate::{services::ServiceError, util::require_user, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub success: bool,
}

// Get user notifications
pub async fn get_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let unread_only = query.unread_only.unwrap_or(false);
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let notifications = NotificationRepository::new(state.pool())
        .list_for_user(user.id, unread_only, limit, offset)
        .await
        .map_err(|err| ApiError::from(ServiceError::from(err)))?;

    Ok(Json(NotificationsResponse { notifications }))
}

// Get unread notification count
pub async fn get_unread_count(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let unread_count = NotificationRepository::new(state.pool())
        .unread_count(user.id)
        .await
        .map_err(|err| ApiError::from(ServiceError::from(err)))?;

    Ok(Json(UnreadCountResponse { unread_count }))
}

// Mark a single notification as read
pub async fn mark_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(notification_id): Path<i64>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let marked = NotificationRepository::new(state.pool())
        .mark_read(notification_id, user.id)
        .await
        .map_err(|err| ApiError::from(ServiceError::from(err)))?;

    if !marked {
        return Err(ApiError::not_found("notification not found"));
    }

    Ok(Json(MarkReadResponse { success: true }))
}

// Mark all notifications as read
pub async fn mark_all_read(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let user = require_user(&state, &headers).await?;

    NotificationRepository::new(state.pool())
        .mark_all_read(user.id)
        .await
        .map_err(|err| ApiError::from(ServiceError::from(err)))?;

    Ok(Json(MarkReadResponse { success: true }))
}
