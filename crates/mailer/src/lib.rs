use std::time::Duration;

use expodesk_config::MailerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("email provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email provider returned {status}: {detail}")]
    Provider { status: u16, detail: String },
}

/// Outcome of a dispatch attempt. `delivered` is false when the provider is
/// not configured and the message was only logged.
#[derive(Debug, Clone)]
pub struct EmailDispatch {
    pub provider_id: Option<String>,
    pub delivered: bool,
}

/// Client for the transactional email provider. Without an API key the client
/// stays in logging mode: sends report success without touching the network,
/// so callers can treat dispatch as non-blocking everywhere.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    endpoint: String,
    from_address: String,
    api_key: Option<String>,
}

impl Mailer {
    pub fn new(config: &MailerConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("expodesk-backend")
            .build()
            .expect("failed to build mailer http client");

        Self {
            http,
            endpoint: config.endpoint.clone(),
            from_address: config.from_address.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<EmailDispatch, MailerError> {
        let Some(api_key) = self.api_key.as_ref() else {
            info!(to, subject, "email provider not configured, logging message instead");
            debug!(body = html, "suppressed email body");
            return Ok(EmailDispatch {
                provider_id: None,
                delivered: false,
            });
        };

        let payload = OutboundEmail {
            from: &self.from_address,
            to: vec![to],
            subject,
            html,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MailerError::Provider {
                status: status.as_u16(),
                detail,
            });
        }

        let body: ProviderResponse = response.json().await?;
        info!(to, subject, id = ?body.id, "email dispatched");

        Ok(EmailDispatch {
            provider_id: body.id,
            delivered: true,
        })
    }
}

#[derive(Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    id: Option<String>,
}
