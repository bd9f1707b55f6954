use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderName, StatusCode},
    response::Redirect,
    Json,
};
use chrono::Utc;
use expodesk_auth::User;
use expodesk_database::{ExhibitorRepository, OrganizerRepository};
use serde::{Deserialize, Serialize};

use crate::{
    services::ServiceError,
    state::{PendingLogin, Portal},
    util::{require_user, session_token, SESSION_COOKIE},
    ApiError, AppState,
};

#[derive(Debug, Deserialize)]
pub struct LineLoginQuery {
    pub portal: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LineCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.public_id,
            email: value.email,
            display_name: value.display_name,
            role: value.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    pub organizer_registered: bool,
    pub exhibitor_registered: bool,
}

/// Kick off a LINE login for one of the portals. Responds with a redirect to
/// the LINE authorize endpoint carrying a one-time state token.
pub async fn line_login(
    State(state): State<AppState>,
    Query(params): Query<LineLoginQuery>,
) -> Result<Redirect, ApiError> {
    if !state.authenticator().line_enabled() {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "LINE login is not configured",
        ));
    }

    let portal = params
        .portal
        .as_deref()
        .and_then(Portal::parse)
        .ok_or_else(|| ApiError::bad_request("portal must be 'organizer' or 'store'"))?;

    let pending = PendingLogin {
        portal,
        next: params.next.filter(|next| next.starts_with('/')),
    };

    let oauth_state = state.oauth_state().issue(pending).await;
    let authorize_url = match state.authenticator().line_authorization_url(&oauth_state) {
        Ok(url) => url,
        Err(err) => {
            state.oauth_state().consume(&oauth_state).await;
            return Err(ApiError::from(err));
        }
    };

    Ok(Redirect::temporary(&authorize_url))
}

/// Finish a LINE login: consume the state, exchange the code, set the session
/// cookie, and send the browser where the pending login wanted to go. Users
/// without a portal profile land on the portal's registration page instead.
pub async fn line_callback(
    State(state): State<AppState>,
    Query(params): Query<LineCallbackQuery>,
) -> Result<([(HeaderName, String); 1], Redirect), ApiError> {
    let oauth_state = params.state.unwrap_or_default();
    let Some(pending) = state.oauth_state().consume(&oauth_state).await else {
        return Err(ApiError::bad_request("invalid or expired OAuth state"));
    };

    if let Some(error) = params.error {
        let detail = params.error_description.unwrap_or_default();
        return Err(ApiError::bad_request(format!(
            "LINE login was not completed: {error} {detail}"
        )));
    }

    let code = params
        .code
        .ok_or_else(|| ApiError::bad_request("missing authorization code"))?;

    let (session, user) = state
        .authenticator()
        .login_with_line_code(&code)
        .await
        .map_err(ApiError::from)?;

    let has_profile = match pending.portal {
        Portal::Organizer => OrganizerRepository::new(state.pool())
            .find_by_user_id(user.id)
            .await
            .map_err(|err| ApiError::from(ServiceError::from(err)))?
            .is_some(),
        Portal::Store => ExhibitorRepository::new(state.pool())
            .find_by_user_id(user.id)
            .await
            .map_err(|err| ApiError::from(ServiceError::from(err)))?
            .is_some(),
    };

    let destination = if has_profile {
        pending
            .next
            .unwrap_or_else(|| pending.portal.home_path().to_string())
    } else {
        pending.portal.register_path().to_string()
    };

    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = session_cookie(&session.token, max_age);

    Ok(([(SET_COOKIE, cookie)], Redirect::to(&destination)))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<([(HeaderName, String); 1], Json<serde_json::Value>), ApiError> {
    let token = session_token(&headers)?;
    state
        .authenticator()
        .logout(&token)
        .await
        .map_err(ApiError::from)?;

    let cookie = session_cookie("", 0);
    Ok(([(SET_COOKIE, cookie)], Json(serde_json::json!({ "success": true }))))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let organizer_registered = OrganizerRepository::new(state.pool())
        .find_by_user_id(user.id)
        .await
        .map_err(|err| ApiError::from(ServiceError::from(err)))?
        .is_some();
    let exhibitor_registered = ExhibitorRepository::new(state.pool())
        .find_by_user_id(user.id)
        .await
        .map_err(|err| ApiError::from(ServiceError::from(err)))?
        .is_some();

    Ok(Json(MeResponse {
        user: user.into(),
        organizer_registered,
        exhibitor_registered,
    }))
}

fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}")
}
