use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use expodesk_database::{Event, EventStatus, Organizer};
use serde::Serialize;

use crate::{
    services::{events, profiles},
    util::require_admin,
    ApiError, AppState,
};

#[derive(Debug, Serialize)]
pub struct PendingOrganizersResponse {
    pub organizers: Vec<Organizer>,
}

#[derive(Debug, Serialize)]
pub struct PendingEventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub success: bool,
}

// Organizers waiting for approval
pub async fn list_pending_organizers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PendingOrganizersResponse>, ApiError> {
    require_admin(&state, &headers).await?;

    let organizers = profiles::list_pending_organizers(&state.pool()).await?;
    Ok(Json(PendingOrganizersResponse { organizers }))
}

// Approve an organizer profile
pub async fn approve_organizer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(organizer_id): Path<i64>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    require_admin(&state, &headers).await?;

    profiles::approve_organizer(&state.pool(), organizer_id).await?;
    Ok(Json(ApprovalResponse { success: true }))
}

// Events waiting for review
pub async fn list_pending_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PendingEventsResponse>, ApiError> {
    require_admin(&state, &headers).await?;

    let events = events::list_pending(&state.pool()).await?;
    Ok(Json(PendingEventsResponse { events }))
}

pub async fn approve_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    require_admin(&state, &headers).await?;

    events::review_event(&state.pool(), event_id, EventStatus::Approved).await?;
    Ok(Json(ApprovalResponse { success: true }))
}

pub async fn reject_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    require_admin(&state, &headers).await?;

    events::review_event(&state.pool(), event_id, EventStatus::Rejected).await?;
    Ok(Json(ApprovalResponse { success: true }))
}
