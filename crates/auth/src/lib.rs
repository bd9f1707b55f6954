use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use cuid2::CuidConstructor;
use expodesk_config::{AuthConfig, LineAuthConfig};
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, ExtraTokenFields,
    RedirectUrl, Scope, StandardRevocableToken, StandardTokenResponse, TokenResponse, TokenUrl,
};
use once_cell::sync::Lazy;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool, Transaction};
use thiserror::Error;
use tracing::{debug, info};

const LINE_AUTHORIZE_URL: &str = "https://access.line.me/oauth2/v2.1/authorize";
const LINE_TOKEN_URL: &str = "https://api.line.me/oauth2/v2.1/token";
const LINE_PROFILE_API: &str = "https://api.line.me/v2/profile";

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    session_ttl: Duration,
    line: Option<LineOAuth>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("line login is not configured")]
    LineOauthDisabled,
    #[error("line login error: {0}")]
    LineOauth(#[from] anyhow::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid session token")]
    InvalidSession,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LineProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: AuthConfig) -> Self {
        let session_ttl = Duration::seconds(config.session_ttl_seconds as i64);
        let line = LineOAuth::from_config(&config.line);

        Self {
            pool,
            session_ttl,
            line,
        }
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    pub fn line_enabled(&self) -> bool {
        self.line.is_some()
    }

    pub fn line_authorization_url(&self, state: &str) -> Result<String, AuthError> {
        let line = self.line.as_ref().ok_or(AuthError::LineOauthDisabled)?;
        line.authorize_url(state).map_err(AuthError::LineOauth)
    }

    pub async fn login_with_line_code(&self, code: &str) -> Result<(AuthSession, User), AuthError> {
        let line = self.line.as_ref().ok_or(AuthError::LineOauthDisabled)?;

        let profile = line
            .exchange_code(code)
            .await
            .map_err(AuthError::LineOauth)?;

        self.login_with_line_profile(profile).await
    }

    /// Log in a LINE profile: an already-linked identity resumes that user, a
    /// matching email links the identity to the existing account, anything
    /// else creates a fresh account.
    pub async fn login_with_line_profile(
        &self,
        profile: LineProfile,
    ) -> Result<(AuthSession, User), AuthError> {
        let mut tx = self.pool.begin().await?;

        if let Some(row) = sqlx::query(
            "SELECT user_id FROM user_identities WHERE provider = 'line' AND provider_uid = ?",
        )
        .bind(&profile.id)
        .fetch_optional(&mut *tx)
        .await?
        {
            let user_id: i64 = row.try_get("user_id")?;
            tx.commit().await?;
            let user = self.fetch_user(user_id).await?;
            let session = self.issue_session(user_id).await?;
            return Ok((session, user));
        }

        let user = if let Some(email) = profile.email.as_ref() {
            if let Some(row) = sqlx::query(
                "SELECT id, public_id, display_name, role FROM users WHERE email = ?",
            )
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?
            {
                User {
                    id: row.try_get("id")?,
                    public_id: row.try_get("public_id")?,
                    email: Some(email.clone()),
                    display_name: row.try_get("display_name")?,
                    role: row.try_get("role")?,
                }
            } else {
                self.insert_user(&mut tx, Some(email.clone()), profile.display_name.clone())
                    .await?
            }
        } else {
            self.insert_user(&mut tx, None, profile.display_name.clone())
                .await?
        };

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO user_identities (user_id, provider, provider_uid, created_at, updated_at) VALUES (?, 'line', ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&profile.id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(user = %user.public_id, email = ?user.email, "linked line identity");
        let session = self.issue_session(user.id).await?;
        Ok((session, user))
    }

    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::SessionNotFound);
        };

        let user_id: i64 = row.try_get("user_id")?;
        let expires_at: String = row.try_get("expires_at")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|_| AuthError::InvalidSession)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            return Err(AuthError::SessionExpired);
        }

        let user = self.fetch_user(user_id).await?;
        let session = AuthSession {
            token: token.to_owned(),
            user_id,
            expires_at,
        };

        Ok((user, session))
    }

    pub async fn user_profile(&self, user_id: i64) -> Result<User, AuthError> {
        self.fetch_user(user_id).await
    }

    /// Drop a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_user(
        &self,
        tx: &mut Transaction<'_, sqlx::Sqlite>,
        email: Option<String>,
        display_name: Option<String>,
    ) -> Result<User, AuthError> {
        let now = Utc::now().to_rfc3339();
        let public_id = new_public_id();

        sqlx::query(
            "INSERT INTO users (public_id, email, display_name, role, created_at, updated_at) VALUES (?, ?, ?, 'member', ?, ?)",
        )
        .bind(&public_id)
        .bind(email.as_deref())
        .bind(display_name.as_deref())
        .bind(&now)
        .bind(&now)
        .execute(&mut **tx)
        .await?;

        let row = sqlx::query("SELECT id FROM users WHERE public_id = ?")
            .bind(&public_id)
            .fetch_one(&mut **tx)
            .await?;

        Ok(User {
            id: row.try_get("id")?,
            public_id,
            email,
            display_name,
            role: "member".to_string(),
        })
    }

    async fn fetch_user(&self, id: i64) -> Result<User, AuthError> {
        let row = sqlx::query(
            "SELECT id, public_id, email, display_name, role FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(User {
            id,
            public_id: row.try_get("public_id")?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            role: row.try_get("role")?,
        })
    }

    async fn issue_session(&self, user_id: i64) -> Result<AuthSession, AuthError> {
        let token = self.generate_session_token();
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(AuthSession {
            token,
            user_id,
            expires_at,
        })
    }

    fn generate_session_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

fn new_public_id() -> String {
    CUID.create_id()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LineExtraTokenFields {
    #[serde(default)]
    id_token: Option<String>,
}

impl ExtraTokenFields for LineExtraTokenFields {}

type LineTokenResponse = StandardTokenResponse<LineExtraTokenFields, BasicTokenType>;

type LineClient = oauth2::Client<
    BasicErrorResponse,
    LineTokenResponse,
    BasicTokenType,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
>;

#[derive(Clone)]
struct LineOAuth {
    client: LineClient,
    http: reqwest::Client,
}

impl LineOAuth {
    fn from_config(config: &LineAuthConfig) -> Option<Self> {
        let channel_id = config.channel_id.clone()?;
        let channel_secret = config.channel_secret.clone()?;
        Some(Self::new(channel_id, channel_secret, config.callback_url.clone()))
    }

    fn new(channel_id: String, channel_secret: String, callback_url: String) -> Self {
        let client = LineClient::new(
            ClientId::new(channel_id),
            Some(ClientSecret::new(channel_secret)),
            AuthUrl::new(LINE_AUTHORIZE_URL.to_string()).expect("invalid line auth url"),
            Some(TokenUrl::new(LINE_TOKEN_URL.to_string()).expect("invalid line token url")),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(RedirectUrl::new(callback_url).expect("invalid line callback url"));

        let http = reqwest::Client::builder()
            .user_agent("expodesk-backend")
            .build()
            .expect("failed to build line http client");

        Self { client, http }
    }

    fn authorize_url(&self, state: &str) -> anyhow::Result<String> {
        let (url, _) = self
            .client
            .authorize_url(|| CsrfToken::new(state.to_owned()))
            .add_scope(Scope::new("profile".to_string()))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .url();

        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> anyhow::Result<LineProfile> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_owned()))
            .request_async(async_http_client)
            .await
            .context("failed to exchange line login code")?;

        let access_token = token_response.access_token().secret();
        let email = token_response
            .extra_fields()
            .id_token
            .as_deref()
            .and_then(email_from_id_token);

        let profile: LineProfileResponse = self
            .http
            .get(LINE_PROFILE_API)
            .bearer_auth(access_token)
            .send()
            .await
            .context("failed to call line profile api")?
            .error_for_status()
            .context("line profile api returned error")?
            .json()
            .await
            .context("failed to decode line profile response")?;

        debug!(user = %profile.user_id, "fetched line user profile");

        Ok(LineProfile {
            id: profile.user_id,
            display_name: profile.display_name,
            email,
        })
    }
}

/// Pull the email claim out of a LINE id_token. The token arrived over the
/// direct token-endpoint exchange, so the payload is decoded without
/// re-verifying the signature.
fn email_from_id_token(id_token: &str) -> Option<String> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes).ok()?;
    claims.email
}

#[derive(Deserialize)]
struct LineProfileResponse {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct IdTokenClaims {
    email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use expodesk_config::DatabaseConfig;
    use tempfile::TempDir;

    async fn create_test_authenticator() -> (Authenticator, SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("auth_test.db");

        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 1,
        };

        let pool = expodesk_database::initialize_database(&config).await.unwrap();
        let authenticator = Authenticator::new(pool.clone(), AuthConfig::default());
        (authenticator, pool, temp_dir)
    }

    fn line_profile(id: &str, email: Option<&str>) -> LineProfile {
        LineProfile {
            id: id.to_string(),
            display_name: Some("Test User".to_string()),
            email: email.map(|value| value.to_string()),
        }
    }

    #[test]
    fn email_claim_is_decoded_from_id_token_payload() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"U1234","email":"user@example.com"}"#);
        let token = format!("header.{payload}.signature");

        assert_eq!(
            email_from_id_token(&token).as_deref(),
            Some("user@example.com")
        );
    }

    #[test]
    fn malformed_id_token_yields_no_email() {
        assert!(email_from_id_token("not-a-jwt").is_none());
        assert!(email_from_id_token("a.%%%.c").is_none());
    }

    #[test]
    fn authorize_url_carries_state_and_scopes() {
        let line = LineOAuth::new(
            "1234567890".to_string(),
            "secret".to_string(),
            "http://127.0.0.1:8720/api/auth/line/callback".to_string(),
        );

        let url = line.authorize_url("state-token").unwrap();
        assert!(url.starts_with(LINE_AUTHORIZE_URL));
        assert!(url.contains("state=state-token"));
        assert!(url.contains("scope=profile+openid+email"));
        assert!(url.contains("client_id=1234567890"));
    }

    #[tokio::test]
    async fn line_login_reuses_linked_identity() {
        let (authenticator, _pool, _temp_dir) = create_test_authenticator().await;

        let (first_session, first_user) = authenticator
            .login_with_line_profile(line_profile("U100", Some("user@example.com")))
            .await
            .unwrap();
        let (second_session, second_user) = authenticator
            .login_with_line_profile(line_profile("U100", Some("user@example.com")))
            .await
            .unwrap();

        assert_eq!(first_user.id, second_user.id);
        assert_ne!(first_session.token, second_session.token);
    }

    #[tokio::test]
    async fn line_login_links_to_existing_email_account() {
        let (authenticator, pool, _temp_dir) = create_test_authenticator().await;

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO users (public_id, email, display_name, role, created_at, updated_at) VALUES ('seeded', 'user@example.com', 'Seeded', 'member', ?, ?)",
        )
        .bind(&now)
        .bind(&now)
        .execute(&pool)
        .await
        .unwrap();

        let (_, user) = authenticator
            .login_with_line_profile(line_profile("U200", Some("user@example.com")))
            .await
            .unwrap();

        assert_eq!(user.public_id, "seeded");
    }

    #[tokio::test]
    async fn token_authentication_round_trip() {
        let (authenticator, _pool, _temp_dir) = create_test_authenticator().await;

        let (session, user) = authenticator
            .login_with_line_profile(line_profile("U300", None))
            .await
            .unwrap();

        let (fetched_user, fetched_session) =
            authenticator.authenticate_token(&session.token).await.unwrap();
        assert_eq!(fetched_user.id, user.id);
        assert_eq!(fetched_session.token, session.token);

        let error = authenticator.authenticate_token("bogus").await.unwrap_err();
        assert!(matches!(error, AuthError::SessionNotFound));
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_removed() {
        let (authenticator, pool, _temp_dir) = create_test_authenticator().await;

        let (session, user) = authenticator
            .login_with_line_profile(line_profile("U400", None))
            .await
            .unwrap();

        let past = (Utc::now() - Duration::hours(1)).to_rfc3339();
        sqlx::query("UPDATE sessions SET expires_at = ? WHERE token = ?")
            .bind(&past)
            .bind(&session.token)
            .execute(&pool)
            .await
            .unwrap();

        let error = authenticator.authenticate_token(&session.token).await.unwrap_err();
        assert!(matches!(error, AuthError::SessionExpired));

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
