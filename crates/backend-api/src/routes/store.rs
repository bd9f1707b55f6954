use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use expodesk_database::{
    Application, ApplicationWithEvent, DocumentKind, Event, Exhibitor,
};
use expodesk_vision::VisionError;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    services::{applications, events, profiles},
    util::{require_exhibitor, require_user},
    ApiError, AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterExhibitorRequest {
    pub company: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachDocumentRequest {
    pub kind: DocumentKind,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDocumentRequest {
    pub image: String,
    #[serde(default, alias = "type")]
    pub document_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub event_id: i64,
}

#[derive(Debug, Serialize)]
pub struct OpenEventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize)]
pub struct MyApplicationsResponse {
    pub applications: Vec<ApplicationWithEvent>,
}

#[derive(Debug, Serialize)]
pub struct AttachDocumentResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDocumentResponse {
    pub success: bool,
    pub extracted_data: ExtractedData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    pub document_type: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub verified: bool,
}

// Register the exhibitor profile for the logged-in account
pub async fn register_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterExhibitorRequest>,
) -> Result<Json<Exhibitor>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let exhibitor = profiles::register_exhibitor(
        &state.pool(),
        &user,
        profiles::NewExhibitorProfile {
            company: payload.company,
            contact_name: payload.contact_name,
            email: payload.email,
            phone: payload.phone,
        },
    )
    .await?;

    Ok(Json(exhibitor))
}

pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Exhibitor>, ApiError> {
    let user = require_user(&state, &headers).await?;
    let exhibitor = profiles::exhibitor_for_user(&state.pool(), &user).await?;
    Ok(Json(exhibitor))
}

/// Attach a compliance-document URL to the exhibitor profile.
pub async fn attach_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AttachDocumentRequest>,
) -> Result<Json<AttachDocumentResponse>, ApiError> {
    let (_, exhibitor) = require_exhibitor(&state, &headers).await?;

    profiles::attach_document(&state.pool(), &exhibitor, payload.kind, &payload.url).await?;

    Ok(Json(AttachDocumentResponse { success: true }))
}

/// Run a compliance document through the vision model.
///
/// Model and network failures never bubble up as 5xx: the handler answers
/// with `success: false` and an unverified verdict so the portal can let the
/// user proceed to manual review. A missing model credential is the one
/// configuration problem that is surfaced.
pub async fn verify_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<VerifyDocumentRequest>,
) -> Result<Json<VerifyDocumentResponse>, ApiError> {
    require_user(&state, &headers).await?;

    if payload.image.trim().is_empty() {
        return Err(ApiError::bad_request("image must not be empty"));
    }

    let hint = payload
        .document_type
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("compliance document");

    match state.vision().verify_document(&payload.image, hint).await {
        Ok(verdict) => Ok(Json(VerifyDocumentResponse {
            success: true,
            extracted_data: ExtractedData {
                document_type: verdict.document_type,
                expiry_date: verdict.expiry_date,
                verified: verdict.verified,
            },
        })),
        Err(VisionError::ApiKeyMissing) => Err(ApiError::internal_server_error(
            "document verification is not configured",
        )),
        Err(err) => {
            warn!(error = %err, "document verification failed, returning unverified");
            Ok(Json(VerifyDocumentResponse {
                success: false,
                extracted_data: ExtractedData {
                    document_type: None,
                    expiry_date: None,
                    verified: false,
                },
            }))
        }
    }
}

// Approved events still accepting applications
pub async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OpenEventsResponse>, ApiError> {
    require_user(&state, &headers).await?;

    let events = events::list_open_for_store(&state.pool()).await?;
    Ok(Json(OpenEventsResponse { events }))
}

pub async fn submit_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitApplicationRequest>,
) -> Result<Json<Application>, ApiError> {
    let (_, exhibitor) = require_exhibitor(&state, &headers).await?;

    let application =
        applications::submit(&state.pool(), &exhibitor, payload.event_id).await?;
    Ok(Json(application))
}

pub async fn list_applications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MyApplicationsResponse>, ApiError> {
    let (_, exhibitor) = require_exhibitor(&state, &headers).await?;

    let listed = applications::list_for_exhibitor(&state.pool(), &exhibitor).await?;
    Ok(Json(MyApplicationsResponse { applications: listed }))
}
