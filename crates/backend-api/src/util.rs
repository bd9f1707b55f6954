use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};
use expodesk_auth::User;
use expodesk_database::{Exhibitor, ExhibitorRepository, Organizer, OrganizerRepository};

use crate::{services::error::ServiceError, ApiError, AppState};

pub const SESSION_COOKIE: &str = "expodesk_session";

/// Pull the session token from the Authorization header, falling back to the
/// portal session cookie set by the OAuth callback.
pub fn session_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(token) = bearer_token(headers)? {
        return Ok(token);
    }

    cookie_token(headers)
        .ok_or_else(|| ApiError::unauthorized("missing session token"))
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|header| header.to_str().ok()) else {
        return Ok(None);
    };

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized("invalid authorization scheme"));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized("missing bearer token"));
    }

    Ok(Some(token.to_string()))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = session_token(headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(user)
}

pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let user = require_user(state, headers).await?;
    if !user.is_admin() {
        return Err(ApiError::forbidden("admin privileges required"));
    }
    Ok(user)
}

/// Resolve the approved organizer profile behind the session. Unregistered
/// users get a 404, unapproved organizers a 403.
pub async fn require_organizer(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(User, Organizer), ApiError> {
    let user = require_user(state, headers).await?;

    let organizer = OrganizerRepository::new(state.pool())
        .find_by_user_id(user.id)
        .await
        .map_err(|err| ApiError::from(ServiceError::from(err)))?
        .ok_or_else(|| ApiError::not_found("organizer profile not found"))?;

    if !organizer.approved {
        return Err(ApiError::forbidden("organizer is not approved yet"));
    }

    Ok((user, organizer))
}

pub async fn require_exhibitor(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(User, Exhibitor), ApiError> {
    let user = require_user(state, headers).await?;

    let exhibitor = ExhibitorRepository::new(state.pool())
        .find_by_user_id(user.id)
        .await
        .map_err(|err| ApiError::from(ServiceError::from(err)))?
        .ok_or_else(|| ApiError::not_found("exhibitor profile not found"))?;

    Ok((user, exhibitor))
}
