//! Failures of a chat-completions call, split by whether a retry can help.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// What the endpoint told us alongside a non-success reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    /// `error.code` from the body, stringified when it is numeric.
    pub error_code: Option<String>,
    /// `x-request-id` response header.
    pub request_id: Option<String>,
}

impl fmt::Display for ResponseMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(code) = &self.error_code {
            write!(f, ", code {code}")?;
        }
        if let Some(id) = &self.request_id {
            write!(f, ", request {id}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API key variable for the chosen provider is unset.
    #[error("{var} is not set")]
    MissingApiKey { var: &'static str },

    #[error("cannot set up http client: {0}")]
    ClientSetup(String),

    #[error("prompt too large: {chars} chars (max {max})")]
    PromptTooLarge { chars: usize, max: usize },

    /// No complete reply within the adapter's timeout.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// Connection-level failure before a status line arrived.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("rate limited ({meta})")]
    RateLimited { meta: ResponseMeta },

    /// 4xx other than 429, or an error object in a 200 body.
    #[error("request rejected ({meta}): {message}")]
    Rejected { message: String, meta: ResponseMeta },

    #[error("server error ({meta}): {message}")]
    ServerError { message: String, meta: ResponseMeta },

    /// A 200 whose body is not a usable completion.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Classify a reqwest failure; timeouts keep the configured limit.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Transport(err)
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::ServerError { .. } => true,
            Self::Transport(e) => e.is_connect() || e.is_request(),
            Self::MissingApiKey { .. }
            | Self::ClientSetup(_)
            | Self::PromptTooLarge { .. }
            | Self::Rejected { .. }
            | Self::Malformed(_) => false,
        }
    }

    /// Short stable code for logs and usage records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingApiKey { .. } => "missing_api_key",
            Self::ClientSetup(_) => "client_setup",
            Self::PromptTooLarge { .. } => "prompt_too_large",
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::RateLimited { .. } => "rate_limited",
            Self::Rejected { .. } => "rejected",
            Self::ServerError { .. } => "server_error",
            Self::Malformed(_) => "malformed_response",
        }
    }

    pub fn meta(&self) -> Option<&ResponseMeta> {
        match self {
            Self::RateLimited { meta } | Self::Rejected { meta, .. } | Self::ServerError { meta, .. } => {
                Some(meta)
            }
            _ => None,
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.meta().and_then(|m| m.request_id.as_deref())
    }
}
