use std::time::Duration;

use chrono::NaiveDate;
use expodesk_config::VisionConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const VERIFICATION_PROMPT: &str = "Look at the attached compliance document and reply with a \
single JSON object and nothing else: {\"document_type\": \"<what the document is>\", \
\"expiry_date\": \"YYYY-MM-DD\" or null, \"valid\": true or false}. The document should be a";

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("invalid json extraction pattern"));

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("missing vision model API key")]
    ApiKeyMissing,
    #[error("vision model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("vision model returned {status}: {detail}")]
    Provider { status: u16, detail: String },
    #[error("vision model returned an empty response")]
    EmptyResponse,
}

/// Normalized verification verdict. `verified` defaults to false whenever the
/// model answer cannot be trusted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentVerdict {
    pub document_type: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub verified: bool,
}

/// Client for an OpenAI-compatible vision chat-completions endpoint.
#[derive(Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl VisionClient {
    pub fn new(config: &VisionConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("expodesk-backend")
            .build()
            .expect("failed to build vision http client");

        Self {
            http,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask the model whether the document at `image_url` is a valid instance
    /// of `document_type`. The answer is normalized through
    /// [`parse_verdict`], so prose-wrapped or malformed model output still
    /// produces a defined verdict.
    pub async fn verify_document(
        &self,
        image_url: &str,
        document_type: &str,
    ) -> Result<DocumentVerdict, VisionError> {
        let api_key = self.api_key.as_ref().ok_or(VisionError::ApiKeyMissing)?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let prompt = format!("{VERIFICATION_PROMPT} {document_type}.");

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                ],
            }],
            max_tokens: 300,
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(VisionError::Provider {
                status: status.as_u16(),
                detail,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(VisionError::EmptyResponse)?;

        debug!(content = %content, "vision model answered");
        Ok(parse_verdict(&content, document_type))
    }
}

/// Normalize a model answer into a verdict. Tries a strict JSON parse first,
/// then extracts a JSON object out of surrounding prose, and finally falls
/// back to a keyword sniff (`yes` / `有効`) as the validity signal.
pub fn parse_verdict(content: &str, document_type_hint: &str) -> DocumentVerdict {
    if let Some(raw) = decode_raw_verdict(content) {
        return DocumentVerdict {
            document_type: raw
                .document_type
                .filter(|value| !value.is_empty())
                .or_else(|| Some(document_type_hint.to_string())),
            expiry_date: raw.expiry_date.as_deref().and_then(parse_expiry_date),
            verified: raw.valid.unwrap_or(false),
        };
    }

    let lowered = content.to_lowercase();
    DocumentVerdict {
        document_type: Some(document_type_hint.to_string()),
        expiry_date: None,
        verified: lowered.contains("yes") || content.contains("有効"),
    }
}

fn decode_raw_verdict(content: &str) -> Option<RawVerdict> {
    let trimmed = content.trim();
    if let Ok(raw) = serde_json::from_str::<RawVerdict>(trimmed) {
        return Some(raw);
    }

    JSON_OBJECT
        .find(content)
        .and_then(|found| serde_json::from_str(found.as_str()).ok())
}

fn parse_expiry_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y/%m/%d"))
        .ok()
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    document_type: Option<String>,
    #[serde(default)]
    expiry_date: Option<String>,
    #[serde(default, alias = "verified")]
    valid: Option<bool>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: String },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}
