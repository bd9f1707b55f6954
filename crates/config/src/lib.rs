use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "expodesk.toml",
    "config/expodesk.toml",
    "crates/config/expodesk.toml",
    "../expodesk.toml",
    "../config/expodesk.toml",
    "../crates/config/expodesk.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mailer: MailerConfig,
    pub vision: VisionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            mailer: MailerConfig::default(),
            vision: VisionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8720,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://expodesk.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default)]
    pub line: LineAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: 86_400,
            line: LineAuthConfig::default(),
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }
}

/// Credentials for the LINE login channel. Login is disabled until both the
/// channel id and secret are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineAuthConfig {
    pub channel_id: Option<String>,
    pub channel_secret: Option<String>,
    #[serde(default = "LineAuthConfig::default_callback_url")]
    pub callback_url: String,
}

impl LineAuthConfig {
    fn default_callback_url() -> String {
        "http://127.0.0.1:8720/api/auth/line/callback".to_string()
    }
}

impl Default for LineAuthConfig {
    fn default() -> Self {
        Self {
            channel_id: None,
            channel_secret: None,
            callback_url: Self::default_callback_url(),
        }
    }
}

/// Configuration options for the transactional email provider.
///
/// ```
/// use expodesk_config::MailerConfig;
///
/// let mailer = MailerConfig::default();
/// assert_eq!(mailer.endpoint, "https://api.resend.com/emails");
/// assert!(mailer.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "MailerConfig::default_endpoint")]
    pub endpoint: String,
    #[serde(default = "MailerConfig::default_from_address")]
    pub from_address: String,
    #[serde(default = "MailerConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl MailerConfig {
    fn default_endpoint() -> String {
        "https://api.resend.com/emails".to_string()
    }

    fn default_from_address() -> String {
        "noreply@expodesk.example".to_string()
    }

    const fn default_request_timeout() -> u64 {
        10
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: Self::default_endpoint(),
            from_address: Self::default_from_address(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Configuration options for the vision-language model used by document
/// verification. Any OpenAI-compatible chat-completions endpoint works.
///
/// ```
/// use expodesk_config::VisionConfig;
///
/// let vision = VisionConfig::default();
/// assert_eq!(vision.base_url, "https://api.openai.com/v1");
/// assert_eq!(vision.request_timeout_seconds, 30);
/// assert!(vision.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "VisionConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "VisionConfig::default_model")]
    pub model: String,
    #[serde(default = "VisionConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl VisionConfig {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    fn default_model() -> String {
        "gpt-4o-mini".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use expodesk_config::load;
///
/// std::env::remove_var("EXPODESK_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let db_max = defaults.database.max_connections as i64;
    let session_ttl = defaults.auth.session_ttl_seconds;
    let session_ttl_i64 = if session_ttl > i64::MAX as u64 {
        i64::MAX
    } else {
        session_ttl as i64
    };

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default("database.max_connections", db_max)
        .unwrap()
        .set_default("auth.session_ttl_seconds", session_ttl_i64)
        .unwrap()
        .set_default("auth.line.callback_url", defaults.auth.line.callback_url.clone())
        .unwrap()
        .set_default("mailer.endpoint", defaults.mailer.endpoint.clone())
        .unwrap()
        .set_default("mailer.from_address", defaults.mailer.from_address.clone())
        .unwrap()
        .set_default(
            "mailer.request_timeout_seconds",
            i64::try_from(defaults.mailer.request_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default("vision.base_url", defaults.vision.base_url.clone())
        .unwrap()
        .set_default("vision.model", defaults.vision.model.clone())
        .unwrap()
        .set_default(
            "vision.request_timeout_seconds",
            i64::try_from(defaults.vision.request_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("EXPODESK").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("EXPODESK_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via EXPODESK_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
