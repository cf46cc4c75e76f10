use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sortbench::gateway::openai_compat::OpenAiCompatAdapter;
use sortbench::gateway::{
    Attribution, Backoff, ChatModel, ChatProvider, ChatRequest, FinishReason, Message,
    ProviderError, ProviderGateway, RetryPolicy, UsageTotals,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn adapter(server: &MockServer) -> OpenAiCompatAdapter {
    adapter_with_timeout(server, Duration::from_secs(5))
}

fn adapter_with_timeout(server: &MockServer, timeout: Duration) -> OpenAiCompatAdapter {
    OpenAiCompatAdapter::with_config("openrouter", "sk-test", server.uri(), timeout).unwrap()
}

fn request() -> ChatRequest {
    ChatRequest::new(
        ChatModel::openrouter("anthropic/claude-3-sonnet"),
        vec![Message::system("sort"), Message::user("Sort these numbers in ascending order: 2, 1")],
        4096,
        Attribution::new("test"),
    )
}

fn success_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "message": { "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 20 }
    })
}

#[tokio::test]
async fn adapter_parses_content_and_usage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "anthropic/claude-3-sonnet",
            "max_tokens": 4096,
            "messages": [
                { "role": "system", "content": "sort" },
                { "role": "user", "content": "Sort these numbers in ascending order: 2, 1" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("['1', '2']")))
        .expect(1)
        .mount(&server)
        .await;

    let resp = adapter(&server).chat(&request()).await.unwrap();
    assert_eq!(resp.content.as_deref(), Some("['1', '2']"));
    assert_eq!(resp.finish_reason, FinishReason::Stop);
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 20);
}

#[tokio::test]
async fn adapter_returns_none_for_missing_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": null }, "finish_reason": "length" }]
        })))
        .mount(&server)
        .await;

    let resp = adapter(&server).chat(&request()).await.unwrap();
    assert!(resp.content.is_none());
    assert_eq!(resp.finish_reason, FinishReason::Length);
    assert_eq!((resp.input_tokens, resp.output_tokens), (0, 0));
}

#[tokio::test]
async fn adapter_maps_rate_limit_and_error_codes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-request-id", "req-123")
                .set_body_json(json!({
                    "error": { "message": "slow down", "code": 429 }
                })),
        )
        .mount(&server)
        .await;

    let err = adapter(&server).chat(&request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::RateLimited { .. }));
    assert!(err.is_retryable());
    assert_eq!(err.request_id(), Some("req-123"));
    let meta = err.meta().unwrap();
    assert_eq!(meta.status, 429);
    assert_eq!(meta.error_code.as_deref(), Some("429"));
}

#[tokio::test]
async fn adapter_rejects_response_without_choices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = adapter(&server).chat(&request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn adapter_reports_error_object_in_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "message": "model not available", "code": "unavailable" }
        })))
        .mount(&server)
        .await;

    let err = adapter(&server).chat(&request()).await.unwrap_err();
    match err {
        ProviderError::Rejected { message, meta } => {
            assert_eq!(message, "model not available");
            assert_eq!(meta.status, 200);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_reply_is_a_retryable_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success_body("['1', '2']"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let timeout = Duration::from_millis(200);
    let err = adapter_with_timeout(&server, timeout)
        .chat(&request())
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.code(), "timeout");
    match err {
        ProviderError::Timeout(after) => assert_eq!(after, timeout),
        other => panic!("unexpected error: {other:?}"),
    }
}

struct FailThenSucceed {
    calls: Arc<AtomicUsize>,
    failures: usize,
}

impl Respond for FailThenSucceed {
    fn respond(&self, _req: &Request) -> ResponseTemplate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            ResponseTemplate::new(503).set_body_json(json!({
                "error": { "message": "upstream unavailable", "code": "overloaded" }
            }))
        } else {
            ResponseTemplate::new(200).set_body_json(success_body("['1', '2']"))
        }
    }
}

#[tokio::test]
async fn gateway_retries_server_errors_and_records_usage() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(FailThenSucceed {
            calls: calls.clone(),
            failures: 2,
        })
        .mount(&server)
        .await;

    let usage = Arc::new(UsageTotals::new());
    let gateway = ProviderGateway::with_policy(
        adapter(&server),
        usage.clone(),
        RetryPolicy::new(3, Backoff::None),
    );

    let resp = gateway.chat(request()).await.unwrap();
    assert_eq!(resp.content.as_deref(), Some("['1', '2']"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let summary = usage.summary();
    assert_eq!(summary.calls, 3);
    assert_eq!(summary.failed_calls, 2);
    assert_eq!(summary.input_tokens, 10);
    assert_eq!(summary.output_tokens, 20);
}

#[tokio::test]
async fn gateway_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(FailThenSucceed {
            calls: calls.clone(),
            failures: usize::MAX,
        })
        .mount(&server)
        .await;

    let gateway = ProviderGateway::with_policy(
        adapter(&server),
        Arc::new(UsageTotals::new()),
        RetryPolicy::new(2, Backoff::None),
    );

    let err = gateway.chat(request()).await.unwrap_err();
    assert_eq!(err.code(), "server_error");
    assert_eq!(err.meta().unwrap().error_code.as_deref(), Some("overloaded"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn gateway_does_not_retry_invalid_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "bad model" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ProviderGateway::with_policy(
        adapter(&server),
        Arc::new(UsageTotals::new()),
        RetryPolicy::new(3, Backoff::None),
    );

    let err = gateway.chat(request()).await.unwrap_err();
    match err {
        ProviderError::Rejected { message, meta } => {
            assert_eq!(message, "bad model");
            assert_eq!(meta.status, 400);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
