use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use expodesk_database::{
    ApplicationStatus, ApplicationWithExhibitor, Event, Organizer,
};
use serde::{Deserialize, Serialize};

use crate::{
    services::{applications, closeout, events, export, profiles},
    util::{require_organizer, require_user},
    ApiError, AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOrganizerRequest {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub starts_on: Option<String>,
    #[serde(default)]
    pub ends_on: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize)]
pub struct EventApplicationsResponse {
    pub applications: Vec<ApplicationWithExhibitor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseApplicationsResponse {
    pub success: bool,
    pub applications: Vec<ApplicationWithExhibitor>,
    pub closed_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseAndExportResponse {
    pub success: bool,
    pub application_count: usize,
    pub closed_at: String,
    pub email_sent: bool,
}

#[derive(Debug, Serialize)]
pub struct SheetsExportResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub status: ApplicationStatus,
}

// Register the organizer profile for the logged-in account
pub async fn register_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterOrganizerRequest>,
) -> Result<Json<Organizer>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let organizer = profiles::register_organizer(
        &state.pool(),
        &user,
        profiles::NewOrganizerProfile {
            name: payload.name,
            company: payload.company,
            email: payload.email,
            phone: payload.phone,
        },
    )
    .await?;

    Ok(Json(organizer))
}

pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Organizer>, ApiError> {
    let user = require_user(&state, &headers).await?;
    let organizer = profiles::organizer_for_user(&state.pool(), &user).await?;
    Ok(Json(organizer))
}

pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let (_, organizer) = require_organizer(&state, &headers).await?;

    let event = events::create_event(
        &state.pool(),
        &organizer,
        events::NewEvent {
            name: payload.name,
            description: payload.description,
            starts_on: payload.starts_on,
            ends_on: payload.ends_on,
        },
    )
    .await?;

    Ok(Json(event))
}

pub async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EventsResponse>, ApiError> {
    let (_, organizer) = require_organizer(&state, &headers).await?;

    let events = events::list_for_organizer(&state.pool(), &organizer).await?;
    Ok(Json(EventsResponse { events }))
}

pub async fn list_event_applications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<Json<EventApplicationsResponse>, ApiError> {
    let (_, organizer) = require_organizer(&state, &headers).await?;

    let applications =
        applications::list_for_event(&state.pool(), &organizer, event_id).await?;
    Ok(Json(EventApplicationsResponse { applications }))
}

pub async fn approve_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
) -> Result<Json<ReviewResponse>, ApiError> {
    review_application(state, headers, application_id, ApplicationStatus::Approved).await
}

pub async fn reject_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
) -> Result<Json<ReviewResponse>, ApiError> {
    review_application(state, headers, application_id, ApplicationStatus::Rejected).await
}

async fn review_application(
    state: AppState,
    headers: HeaderMap,
    application_id: i64,
    status: ApplicationStatus,
) -> Result<Json<ReviewResponse>, ApiError> {
    let (_, organizer) = require_organizer(&state, &headers).await?;

    let application =
        applications::review(&state.pool(), &organizer, application_id, status).await?;

    Ok(Json(ReviewResponse {
        success: true,
        status: application.status,
    }))
}

/// Close the application window and return the applicant list.
pub async fn close_applications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<Json<CloseApplicationsResponse>, ApiError> {
    let (_, organizer) = require_organizer(&state, &headers).await?;

    let closed = events::close_applications(&state.pool(), &organizer, event_id).await?;

    Ok(Json(CloseApplicationsResponse {
        success: true,
        applications: closed.applications,
        closed_at: closed.closed_at,
    }))
}

/// Download the applicant list as CSV without closing the event.
pub async fn export_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, organizer) = require_organizer(&state, &headers).await?;

    let (event, listed) =
        events::applications_for_export(&state.pool(), &organizer, event_id).await?;
    let body = export::render_applicants_csv(&listed)?;

    let response_headers = [
        (
            header::CONTENT_TYPE,
            "text/csv; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"event-{}-applications.csv\"", event.id),
        ),
    ];

    Ok((response_headers, body))
}

/// Spreadsheet export is handled by an external integration that has not been
/// wired up; the endpoint answers with a placeholder payload.
pub async fn export_sheets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<Json<SheetsExportResponse>, ApiError> {
    let (_, organizer) = require_organizer(&state, &headers).await?;

    // Validates the event the same way the CSV export does before answering.
    events::applications_for_export(&state.pool(), &organizer, event_id).await?;

    Ok(Json(SheetsExportResponse {
        success: false,
        message: "Google Sheets export is not available yet".to_string(),
    }))
}

/// Close, export, and notify in one request.
pub async fn close_and_export(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<Json<CloseAndExportResponse>, ApiError> {
    let (_, organizer) = require_organizer(&state, &headers).await?;

    let outcome =
        closeout::close_and_export(&state.pool(), state.mailer(), &organizer, event_id).await?;

    Ok(Json(CloseAndExportResponse {
        success: true,
        application_count: outcome.applications.len(),
        closed_at: outcome.closed_at,
        email_sent: outcome.email.succeeded(),
    }))
}
