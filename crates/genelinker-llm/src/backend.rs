//! LLM backend trait and the OpenAI-compatible chat-completion client.
//!
//! Any endpoint that speaks `POST {base}/chat/completions` works: OpenAI,
//! Groq, OpenRouter, a local vLLM or LM Studio server.

use async_trait::async_trait;
use genelinker_common::sandbox::SandboxClient;
use genelinker_common::{FallbackReason, GeneLinkerError};
use genelinker_config::Credential;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Request blocked: {0}")]
    Blocked(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Classify the failure for the fallback result shown to the user.
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            LlmError::Http(e) if e.is_timeout() => FallbackReason::Timeout,
            LlmError::Http(e) if e.is_decode() => FallbackReason::MalformedResponse,
            LlmError::Http(_) | LlmError::Blocked(_) => FallbackReason::Network,
            LlmError::Unavailable(_) => FallbackReason::MissingCredential,
            LlmError::ApiError { status, .. } => FallbackReason::HttpStatus(*status),
            LlmError::Serde(_) | LlmError::Malformed(_) => FallbackReason::MalformedResponse,
        }
    }
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
    fn backend_name(&self) -> &str;
}

// ── Helper: parse OpenAI-style response ──────────────────────────────────────

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> Result<LlmResponse, LlmError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::Malformed("missing choices[0].message.content".to_string()))?;
    Ok(LlmResponse {
        content: content.to_string(),
        model: json["model"]
            .as_str()
            .unwrap_or(fallback_model)
            .to_string(),
        prompt_tokens:     json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    })
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        let body: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
        let msg = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(LlmError::ApiError { status: status.as_u16(), message: msg });
    }
    Ok(serde_json::from_str(&text)?)
}

// ── OpenAI-compatible ─────────────────────────────────────────────────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    credential: Credential,
    client: SandboxClient,
}

impl OpenAiCompatibleBackend {
    /// `client` is extended to allow `base_url`'s host.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        credential: Credential,
        mut client: SandboxClient,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        client.allow_endpoint(&base_url);
        Self { base_url, model: model.into(), credential, client }
    }

    pub fn from_config(config: &genelinker_config::Config, client: SandboxClient) -> Self {
        Self::new(
            config.llm.endpoint.clone(),
            config.llm.model_name.clone(),
            config.llm.credential.clone(),
            client,
        )
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_usable()
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    #[instrument(skip(self, req), fields(model = %self.model))]
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let key = self
            .credential
            .expose()
            .ok_or_else(|| LlmError::Unavailable("no API credential configured".to_string()))?;
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model":       req.model.as_deref().unwrap_or(&self.model),
            "messages":    req.messages,
            "max_tokens":  req.max_tokens.unwrap_or(800),
            "temperature": req.temperature.unwrap_or(0.3),
        });
        let resp = self.client
            .post(&url)
            .map_err(|e| match e {
                GeneLinkerError::SecurityError(msg) => LlmError::Blocked(msg),
                other => LlmError::Unavailable(other.to_string()),
            })?
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;
        parse_openai_response(&json, &self.model)
    }

    fn model_id(&self) -> &str { &self.model }
    fn backend_name(&self) -> &str { "openai-compatible" }
}
