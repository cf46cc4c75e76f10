//! HTTP adapter for `POST {base}/chat/completions` (OpenRouter and OpenAI).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::error::{ProviderError, ResponseMeta};
use super::types::{ChatModel, ChatRequest, ChatResponse, FinishReason, Message};
use super::ChatProvider;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Replies past this size are rejected instead of buffered.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Largest prompt we send; generated questions stay far below it.
const MAX_PROMPT_CHARS: usize = 500_000;

/// Where a provider lives and which env variables configure it.
struct Endpoint {
    provider: &'static str,
    key_var: &'static str,
    base_url_var: &'static str,
    timeout_var: &'static str,
    default_base_url: &'static str,
}

const OPENROUTER: Endpoint = Endpoint {
    provider: "openrouter",
    key_var: "OPENROUTER_API_KEY",
    base_url_var: "OPENROUTER_BASE_URL",
    timeout_var: "OPENROUTER_TIMEOUT_SECONDS",
    default_base_url: OPENROUTER_BASE_URL,
};

const OPENAI: Endpoint = Endpoint {
    provider: "openai",
    key_var: "OPENAI_API_KEY",
    base_url_var: "OPENAI_BASE_URL",
    timeout_var: "OPENAI_TIMEOUT_SECONDS",
    default_base_url: OPENAI_BASE_URL,
};

#[derive(Debug, Clone)]
pub struct OpenAiCompatAdapter {
    http: reqwest::Client,
    completions_url: String,
    provider: &'static str,
    timeout: Duration,
}

impl OpenAiCompatAdapter {
    /// Adapter for `model`'s provider. Reads `<PROVIDER>_API_KEY` (required),
    /// `<PROVIDER>_BASE_URL` and `<PROVIDER>_TIMEOUT_SECONDS`.
    pub fn from_env_for(model: &ChatModel) -> Result<Self, ProviderError> {
        let endpoint = match model {
            ChatModel::OpenRouter(_) => &OPENROUTER,
            ChatModel::OpenAi(_) => &OPENAI,
        };

        let api_key = std::env::var(endpoint.key_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey {
                var: endpoint.key_var,
            })?;
        let base_url = std::env::var(endpoint.base_url_var)
            .unwrap_or_else(|_| endpoint.default_base_url.to_string());
        let timeout = std::env::var(endpoint.timeout_var)
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self::with_config(endpoint.provider, api_key, base_url, timeout)
    }

    pub fn with_config(
        provider: &'static str,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.into()))
            .map_err(|_| ProviderError::ClientSetup("API key is not a valid header value".into()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| ProviderError::ClientSetup(e.to_string()))?;

        Ok(Self {
            http,
            completions_url: format!("{}/chat/completions", base_url.into().trim_end_matches('/')),
            provider,
            timeout,
        })
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// Buffer the body, giving up once it passes `MAX_RESPONSE_BYTES`.
    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>, ProviderError> {
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProviderError::from_transport(e, self.timeout))?
        {
            if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
                return Err(ProviderError::Malformed(format!(
                    "{} reply exceeds {MAX_RESPONSE_BYTES} bytes",
                    self.provider
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
    error: Option<WireError>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: Option<WireMessage>,
    finish_reason: Option<FinishReason>,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct WireError {
    message: Option<String>,
    code: Option<serde_json::Value>,
}

/// Both providers send `{"error": {...}}`, sometimes with a 200 status.
fn error_body(body: &[u8]) -> Option<WireError> {
    serde_json::from_slice::<WireResponse>(body).ok()?.error
}

fn status_error(status: StatusCode, mut meta: ResponseMeta, body: &[u8]) -> ProviderError {
    let mut message = status.canonical_reason().unwrap_or("error").to_string();
    if let Some(err) = error_body(body) {
        if let Some(m) = err.message {
            message = m;
        }
        meta.error_code = err.code.map(|code| match code {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { meta },
        s if s.is_server_error() => ProviderError::ServerError { message, meta },
        _ => ProviderError::Rejected { message, meta },
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatAdapter {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let chars: usize = req.messages.iter().map(|m| m.content.len()).sum();
        if chars > MAX_PROMPT_CHARS {
            return Err(ProviderError::PromptTooLarge {
                chars,
                max: MAX_PROMPT_CHARS,
            });
        }

        let start = Instant::now();
        let response = self
            .http
            .post(&self.completions_url)
            .json(&WireRequest {
                model: req.model.model_id(),
                messages: &req.messages,
                max_tokens: req.max_tokens,
            })
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, self.timeout))?;

        let status = response.status();
        let meta = ResponseMeta {
            status: status.as_u16(),
            error_code: None,
            request_id: response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        };
        let body = self.read_body(response).await?;

        if !status.is_success() {
            return Err(status_error(status, meta, &body));
        }

        let parsed: WireResponse = serde_json::from_slice(&body)
            .map_err(|e| ProviderError::Malformed(format!("invalid JSON: {e}")))?;
        if let Some(err) = parsed.error {
            return Err(ProviderError::Rejected {
                message: err.message.unwrap_or_default(),
                meta,
            });
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("no choices".into()))?;
        let usage = parsed.usage.unwrap_or_default();

        Ok(ChatResponse {
            content: choice.message.and_then(|m| m.content),
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            latency: start.elapsed(),
            finish_reason: choice.finish_reason.unwrap_or_default(),
        })
    }
}
