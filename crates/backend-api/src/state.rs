use std::{collections::HashMap, sync::Arc, time::Duration as StdDuration, time::Instant};

use expodesk_auth::{AuthSession, Authenticator, User};
use expodesk_mailer::Mailer;
use expodesk_vision::VisionClient;
use rand::{distributions::Alphanumeric, Rng};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::ApiError;

const DEFAULT_OAUTH_STATE_TTL: StdDuration = StdDuration::from_secs(600);

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    authenticator: Authenticator,
    mailer: Arc<Mailer>,
    vision: Arc<VisionClient>,
    oauth_state: OAuthStateStore,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        authenticator: Authenticator,
        mailer: Mailer,
        vision: VisionClient,
    ) -> Self {
        Self {
            pool,
            authenticator,
            mailer: Arc::new(mailer),
            vision: Arc::new(vision),
            oauth_state: OAuthStateStore::default(),
        }
    }

    pub fn with_oauth_store(
        pool: SqlitePool,
        authenticator: Authenticator,
        mailer: Mailer,
        vision: VisionClient,
        oauth_state: OAuthStateStore,
    ) -> Self {
        Self {
            pool,
            authenticator,
            mailer: Arc::new(mailer),
            vision: Arc::new(vision),
            oauth_state,
        }
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn mailer(&self) -> &Mailer {
        &self.mailer
    }

    pub fn vision(&self) -> &VisionClient {
        &self.vision
    }

    pub fn oauth_state(&self) -> &OAuthStateStore {
        &self.oauth_state
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}

/// Which portal a login was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Portal {
    Organizer,
    Store,
}

impl Portal {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "organizer" => Some(Portal::Organizer),
            "store" => Some(Portal::Store),
            _ => None,
        }
    }

    pub fn home_path(&self) -> &'static str {
        match self {
            Portal::Organizer => "/organizer",
            Portal::Store => "/store",
        }
    }

    pub fn register_path(&self) -> &'static str {
        match self {
            Portal::Organizer => "/organizer/register",
            Portal::Store => "/store/register",
        }
    }
}

/// What the callback needs to finish a login that bounced through LINE.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub portal: Portal,
    pub next: Option<String>,
}

#[derive(Clone)]
pub struct OAuthStateStore {
    inner: Arc<Mutex<HashMap<String, (Instant, PendingLogin)>>>,
    ttl: StdDuration,
}

impl OAuthStateStore {
    pub fn new(ttl: StdDuration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn issue(&self, login: PendingLogin) -> String {
        let state = Self::random_state();
        self.store(state.clone(), login).await;
        state
    }

    pub async fn store(&self, state: String, login: PendingLogin) {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard, self.ttl);
        guard.insert(state, (Instant::now(), login));
    }

    pub async fn consume(&self, state: &str) -> Option<PendingLogin> {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard, self.ttl);
        guard.remove(state).map(|(_, login)| login)
    }

    fn random_state() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }

    fn prune(map: &mut HashMap<String, (Instant, PendingLogin)>, ttl: StdDuration) {
        let now = Instant::now();
        map.retain(|_, (created, _)| now.duration_since(*created) <= ttl);
    }
}

impl Default for OAuthStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_OAUTH_STATE_TTL)
    }
}
