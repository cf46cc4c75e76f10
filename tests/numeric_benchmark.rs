use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sortbench::benchmark::{render_numeric_report, run_numeric_benchmark};
use sortbench::client::{AnswerError, FnAnswerer, SortingClient};
use sortbench::config::{NumberSortingConfig, NumericBenchmarkConfig};
use sortbench::gateway::openai_compat::OpenAiCompatAdapter;
use sortbench::gateway::{Backoff, ChatModel, ProviderGateway, RetryPolicy, UsageTotals};
use sortbench::numeric::{BaselineDataset, NumberSortingDataset};
use sortbench::prompts::NUMERIC_SYSTEM_PROMPT;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(size: usize) -> NumericBenchmarkConfig {
    NumericBenchmarkConfig {
        size,
        seed: 42,
        sorting: NumberSortingConfig::default(),
    }
}

/// Oracle answerer: looks the question up in an identically seeded dataset.
fn oracle(config: &NumericBenchmarkConfig) -> impl Fn(&str) -> Result<String, AnswerError> {
    let dataset = NumberSortingDataset::create(&config.sorting, config.size, config.seed).unwrap();
    move |question: &str| {
        dataset
            .entries()
            .iter()
            .find(|e| e.question == question)
            .map(|e| e.answer.clone())
            .ok_or_else(|| AnswerError::Other("unknown question".to_string()))
    }
}

#[tokio::test]
async fn oracle_answers_score_perfectly() {
    let config = config(20);
    let answerer = FnAnswerer::sync(oracle(&config));
    let result = run_numeric_benchmark(&answerer, &config).await.unwrap();

    assert_eq!(result.test_cases.len(), 20);
    assert_eq!(result.overall_score, 1.0);
    for case in &result.test_cases {
        assert_eq!(case.model_answer, case.correct_answer);
        assert_eq!(case.parsed_values, case.correct_values);
        // Repeated values tie, so tau can fall short of 1.
        assert!(case.kendall_tau > 0.0);
    }
}

#[tokio::test]
async fn unparseable_answers_score_zero() {
    let config = config(5);
    let answerer = FnAnswerer::sync(|_: &str| Ok("I refuse".to_string()));
    let result = run_numeric_benchmark(&answerer, &config).await.unwrap();

    assert_eq!(result.overall_score, 0.0);
    assert_eq!(result.overall_kendall_tau, 0.0);
    for case in &result.test_cases {
        assert_eq!(case.kendall_p_value, 1.0);
        assert!(case.parsed_values.is_empty());
        assert!(!case.correct_values.is_empty());
    }

    let report = render_numeric_report(&result);
    assert!(report.contains("Overall Score: 0.00%"));
    assert!(report.contains("Parsed Values: []"));
}

#[tokio::test]
async fn numeric_questions_use_numeric_system_prompt() {
    let server = MockServer::start().await;
    let config = config(1);
    let dataset = NumberSortingDataset::create(&config.sorting, 1, config.seed).unwrap();
    let entry = &dataset.entries()[0];

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": NUMERIC_SYSTEM_PROMPT },
                { "role": "user", "content": entry.question }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": { "content": format!("```python\n{}\n```", entry.answer) },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 30, "completion_tokens": 8 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = OpenAiCompatAdapter::with_config(
        "openai",
        "sk-test",
        server.uri(),
        Duration::from_secs(5),
    )
    .unwrap();
    let usage = Arc::new(UsageTotals::new());
    let gateway =
        ProviderGateway::with_policy(adapter, usage.clone(), RetryPolicy::new(1, Backoff::None));
    let client = SortingClient::new(Arc::new(gateway), ChatModel::openai("gpt-4o-mini"));

    let result = run_numeric_benchmark(&client, &config).await.unwrap();
    assert_eq!(result.overall_score, 1.0);
    assert_eq!(result.test_cases[0].model_answer, entry.answer);
    assert_eq!(usage.summary().input_tokens, 30);
}

#[tokio::test]
async fn invalid_numeric_config_is_rejected() {
    let mut config = config(3);
    config.sorting.min_value = 10.0;
    config.sorting.max_value = -10.0;
    let answerer = FnAnswerer::sync(|_: &str| Ok(String::new()));
    assert!(run_numeric_benchmark(&answerer, &config).await.is_err());
}
