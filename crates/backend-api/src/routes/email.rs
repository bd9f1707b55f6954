use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::{util::require_admin, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}

/// Send a one-off email through the configured provider. Without a provider
/// credential the dispatch degrades to a log line and still succeeds.
pub async fn send_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    require_admin(&state, &headers).await?;

    if !payload.to.contains('@') {
        return Err(ApiError::bad_request("recipient must be an email address"));
    }
    if payload.subject.trim().is_empty() {
        return Err(ApiError::bad_request("subject must not be empty"));
    }

    let dispatch = state
        .mailer()
        .send(&payload.to, &payload.subject, &payload.html)
        .await
        .map_err(|err| {
            ApiError::internal_server_error(format!("email dispatch failed: {err}"))
        })?;

    Ok(Json(SendEmailResponse {
        success: true,
        email_id: dispatch.provider_id,
    }))
}
