//! Request and response shapes shared by the gateway and its callers.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tags a request with where it came from, so usage records can be grouped
/// per benchmark run.
#[derive(Debug, Clone, Default)]
pub struct Attribution {
    pub run_id: Option<Uuid>,
    /// Code path that sent the request, e.g. "sortbench::cli".
    pub caller: &'static str,
}

impl Attribution {
    pub fn new(caller: &'static str) -> Self {
        Self {
            run_id: None,
            caller,
        }
    }

    pub fn with_run(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }
}

/// Sorting prompts only ever carry a system turn and the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One chat turn. Serializes directly into the chat-completions wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Which model to call, and through which provider.
///
/// Both providers speak the same chat-completions wire format; the variant only
/// decides which endpoint/key the model id belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatModel {
    /// OpenRouter model, e.g. "anthropic/claude-3-sonnet"
    OpenRouter(String),
    /// OpenAI model, e.g. "gpt-4o-mini"
    OpenAi(String),
}

impl ChatModel {
    pub fn openrouter(model_id: impl Into<String>) -> Self {
        ChatModel::OpenRouter(model_id.into())
    }

    pub fn openai(model_id: impl Into<String>) -> Self {
        ChatModel::OpenAi(model_id.into())
    }

    pub fn model_id(&self) -> &str {
        match self {
            ChatModel::OpenRouter(id) | ChatModel::OpenAi(id) => id,
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            ChatModel::OpenRouter(_) => "openrouter",
            ChatModel::OpenAi(_) => "openai",
        }
    }
}

/// A single completion call: no sampling overrides, always a token cap.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: ChatModel,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub attribution: Attribution,
}

impl ChatRequest {
    pub fn new(
        model: ChatModel,
        messages: Vec<Message>,
        max_tokens: u32,
        attribution: Attribution,
    ) -> Self {
        Self {
            model,
            messages,
            max_tokens,
            attribution,
        }
    }
}

/// Why generation stopped, as reported by the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    /// Cut off at `max_tokens`; the answer list is probably incomplete.
    Length,
    ContentFilter,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// `None` when the choice had no message content; callers decide whether
    /// that is an error.
    pub content: Option<String>,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub latency: Duration,
    pub finish_reason: FinishReason,
}
