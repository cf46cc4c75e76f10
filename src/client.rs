//! The model side of a benchmark run: something that answers sorting questions.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::gateway::{Attribution, ChatGateway, ChatModel, ChatRequest, ProviderError};
use crate::prompts::{clean_answer, sort_messages};

pub const DEFAULT_OPENROUTER_MODEL: &str = "anthropic/claude-3-sonnet";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("no response from model")]
    NoResponse,
    #[error("{0}")]
    Other(String),
}

/// Answers a question with raw text.
#[async_trait]
pub trait SortAnswerer: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String, AnswerError>;
}

type AnswerFuture = Pin<Box<dyn Future<Output = Result<String, AnswerError>> + Send>>;

/// Adapts a closure returning a future into a `SortAnswerer`.
pub struct FnAnswerer<F> {
    f: F,
}

impl<F> FnAnswerer<F>
where
    F: Fn(String) -> AnswerFuture + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl FnAnswerer<()> {
    /// Adapt a synchronous closure.
    pub fn sync<G>(g: G) -> FnAnswerer<impl Fn(String) -> AnswerFuture + Send + Sync>
    where
        G: Fn(&str) -> Result<String, AnswerError> + Send + Sync + 'static,
    {
        let g = Arc::new(g);
        FnAnswerer::new(move |question: String| -> AnswerFuture {
            let g = Arc::clone(&g);
            Box::pin(async move { g(&question) })
        })
    }
}

#[async_trait]
impl<F> SortAnswerer for FnAnswerer<F>
where
    F: Fn(String) -> AnswerFuture + Send + Sync,
{
    async fn answer(&self, question: &str) -> Result<String, AnswerError> {
        (self.f)(question.to_string()).await
    }
}

/// Sends sorting questions to a chat model through a gateway.
pub struct SortingClient {
    gateway: Arc<dyn ChatGateway>,
    model: ChatModel,
    max_tokens: u32,
    attribution: Attribution,
}

impl SortingClient {
    pub fn new(gateway: Arc<dyn ChatGateway>, model: ChatModel) -> Self {
        Self {
            gateway,
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            attribution: Attribution::new("sortbench::client"),
        }
    }

    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = attribution;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &ChatModel {
        &self.model
    }
}

#[async_trait]
impl SortAnswerer for SortingClient {
    async fn answer(&self, question: &str) -> Result<String, AnswerError> {
        let req = ChatRequest::new(
            self.model.clone(),
            sort_messages(question),
            self.max_tokens,
            self.attribution.clone(),
        );

        let resp = self.gateway.chat(req).await?;
        debug!(
            model = self.model.model_id(),
            output_tokens = resp.output_tokens,
            latency_ms = resp.latency.as_millis() as u64,
            finish_reason = ?resp.finish_reason,
            "model answered"
        );

        // A blank reply is a failed call, not a wrong answer.
        let answer = resp
            .content
            .map(|content| clean_answer(&content))
            .unwrap_or_default();
        if answer.is_empty() {
            return Err(AnswerError::NoResponse);
        }
        Ok(answer)
    }
}

/// Default model for a provider name (`openrouter` or `openai`).
pub fn default_model(provider: &str) -> Option<ChatModel> {
    match provider {
        "openrouter" => Some(ChatModel::openrouter(DEFAULT_OPENROUTER_MODEL)),
        "openai" => Some(ChatModel::openai(DEFAULT_OPENAI_MODEL)),
        _ => None,
    }
}
