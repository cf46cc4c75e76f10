//! Usage tracking via the UsageSink trait.
//!
//! The gateway reports every call to a UsageSink. This keeps the gateway free
//! of any storage or reporting concern:
//! - `UsageTotals` accumulates a per-run summary
//! - `TracingUsageSink` emits one structured log line per call
//! - a pair `(A, B)` of sinks forwards to both
//! - tests use `NoopUsageSink`

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Status of a provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Success,
    Error,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Success => "success",
            CallStatus::Error => "error",
        }
    }
}

/// Record of a provider API call.
#[derive(Debug, Clone)]
pub struct ProviderCallRecord {
    /// Provider name: "openai", "openrouter".
    pub provider: &'static str,
    /// Model used.
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub latency_ms: u64,
    pub status: CallStatus,
    /// Error code if status is Error.
    pub error_code: Option<String>,
    /// 1-based attempt number within the retry loop.
    pub attempt: u32,
    /// Which code path made this call.
    pub caller: &'static str,
    /// Benchmark run this call belongs to.
    pub run_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl ProviderCallRecord {
    pub fn new(provider: &'static str, model: impl Into<String>, caller: &'static str) -> Self {
        Self {
            provider,
            model: model.into(),
            input_tokens: 0,
            output_tokens: 0,
            latency_ms: 0,
            status: CallStatus::Success,
            error_code: None,
            attempt: 1,
            caller,
            run_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn tokens(mut self, input: u32, output: u32) -> Self {
        self.input_tokens = input;
        self.output_tokens = output;
        self
    }

    pub fn latency(mut self, ms: u64) -> Self {
        self.latency_ms = ms;
        self
    }

    pub fn attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    pub fn run(mut self, run_id: Option<Uuid>) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn error(mut self, code: impl Into<String>) -> Self {
        self.status = CallStatus::Error;
        self.error_code = Some(code.into());
        self
    }
}

/// Trait for recording provider call usage.
#[async_trait]
pub trait UsageSink: Send + Sync {
    /// Record a provider call. Fire-and-forget: failures are logged, never
    /// propagated.
    async fn record(&self, record: ProviderCallRecord);
}

/// No-op usage sink that discards all records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUsageSink;

#[async_trait]
impl UsageSink for NoopUsageSink {
    async fn record(&self, _record: ProviderCallRecord) {}
}

/// Emits every record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUsageSink;

#[async_trait]
impl UsageSink for TracingUsageSink {
    async fn record(&self, record: ProviderCallRecord) {
        let run_id = record.run_id.map(|id| id.to_string()).unwrap_or_default();
        tracing::info!(
            provider = record.provider,
            model = %record.model,
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            latency_ms = record.latency_ms,
            status = record.status.as_str(),
            error_code = record.error_code.as_deref().unwrap_or(""),
            attempt = record.attempt,
            caller = record.caller,
            run_id = %run_id,
            at = %record.timestamp.to_rfc3339(),
            "provider call"
        );
    }
}

/// Aggregated counters across all calls of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct UsageSummary {
    pub calls: u64,
    pub failed_calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// In-memory sink accumulating a `UsageSummary`.
#[derive(Debug, Default)]
pub struct UsageTotals {
    inner: Mutex<UsageSummary>,
}

impl UsageTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> UsageSummary {
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl UsageSink for UsageTotals {
    async fn record(&self, record: ProviderCallRecord) {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.calls += 1;
        if record.status == CallStatus::Error {
            guard.failed_calls += 1;
        }
        guard.input_tokens += u64::from(record.input_tokens);
        guard.output_tokens += u64::from(record.output_tokens);
    }
}

/// Forward each record to both sinks, e.g. log it and count it.
#[async_trait]
impl<A: UsageSink, B: UsageSink> UsageSink for (A, B) {
    async fn record(&self, record: ProviderCallRecord) {
        self.0.record(record.clone()).await;
        self.1.record(record).await;
    }
}
