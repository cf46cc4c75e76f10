//! Provider gateway for chat completions.

pub mod error;
pub mod openai_compat;
pub mod retry;
pub mod types;
pub mod usage;

use std::sync::Arc;

use tokio::time::sleep;
use tracing::warn;

use openai_compat::OpenAiCompatAdapter;
use usage::{ProviderCallRecord, UsageSink as UsageSinkTrait};

pub use error::{ProviderError, ResponseMeta};
pub use retry::{Backoff, RetryPolicy};
pub use types::*;
pub use usage::{NoopUsageSink, TracingUsageSink, UsageSink, UsageSummary, UsageTotals};

/// One endpoint, one attempt.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// What the rest of the crate talks to: a provider plus retries and usage.
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Retrying gateway in front of a single chat provider.
pub struct ProviderGateway<U: UsageSinkTrait> {
    provider: Box<dyn ChatProvider>,
    provider_name: &'static str,
    usage_sink: Arc<U>,
    retry: RetryPolicy,
}

#[async_trait::async_trait]
impl<U: UsageSinkTrait> ChatGateway for ProviderGateway<U> {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ProviderError> {
        ProviderGateway::chat(self, req).await
    }
}

impl<U: UsageSinkTrait> ProviderGateway<U> {
    /// Gateway for `model`'s provider with credentials from the environment and
    /// the default retry policy.
    pub fn from_env(model: &ChatModel, usage_sink: Arc<U>) -> Result<Self, ProviderError> {
        let adapter = OpenAiCompatAdapter::from_env_for(model)?;
        Ok(Self::with_policy(adapter, usage_sink, RetryPolicy::default()))
    }

    pub fn with_policy(adapter: OpenAiCompatAdapter, usage_sink: Arc<U>, retry: RetryPolicy) -> Self {
        let provider_name = adapter.provider();
        Self::with_provider(Box::new(adapter), provider_name, usage_sink, retry)
    }

    /// Gateway over an arbitrary provider implementation.
    pub fn with_provider(
        provider: Box<dyn ChatProvider>,
        provider_name: &'static str,
        usage_sink: Arc<U>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            provider_name,
            usage_sink,
            retry,
        }
    }

    pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let mut attempt = 0u32;
        loop {
            let result = self.provider.chat(&req).await;
            self.record_usage(&req, attempt, &result).await;

            let err = match result {
                Ok(resp) => return Ok(resp),
                Err(err) => err,
            };
            if !err.is_retryable() || !self.retry.should_retry(attempt) {
                return Err(err);
            }

            let delay = self.retry.delay(attempt);
            warn!(
                attempt = attempt + 1,
                max_attempts = self.retry.attempts(),
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "provider call failed, retrying"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn record_usage(
        &self,
        req: &ChatRequest,
        attempt: u32,
        result: &Result<ChatResponse, ProviderError>,
    ) {
        let record = ProviderCallRecord::new(
            self.provider_name,
            req.model.model_id(),
            req.attribution.caller,
        )
        .attempt(attempt + 1)
        .run(req.attribution.run_id);

        let record = match result {
            Ok(resp) => record
                .tokens(resp.input_tokens, resp.output_tokens)
                .latency(resp.latency.as_millis() as u64),
            Err(err) => record.error(err.code()),
        };
        self.usage_sink.record(record).await;
    }
}
