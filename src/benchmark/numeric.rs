use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::SortAnswerer;
use crate::config::NumericBenchmarkConfig;
use crate::numeric::{evaluate_numeric, BaselineDataset, NumberSortingDataset};
use crate::types::SortDirection;

use super::{mean_over, BenchmarkError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericCaseResult {
    pub id: usize,
    pub direction: SortDirection,
    pub question: String,
    pub correct_answer: String,
    pub model_answer: String,
    /// Numbers read from the model's answer, in answer order.
    pub parsed_values: Vec<f64>,
    pub correct_values: Vec<f64>,
    pub score: f64,
    pub kendall_tau: f64,
    pub kendall_p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericBenchmarkResult {
    pub overall_score: f64,
    pub overall_kendall_tau: f64,
    pub test_cases: Vec<NumericCaseResult>,
}

/// Score `answerer` on the baseline number-sorting dataset.
pub async fn run_numeric_benchmark(
    answerer: &dyn SortAnswerer,
    config: &NumericBenchmarkConfig,
) -> Result<NumericBenchmarkResult, BenchmarkError> {
    let dataset = NumberSortingDataset::create(&config.sorting, config.size, config.seed)?;
    info!(cases = dataset.len(), seed = config.seed, "running numeric benchmark");

    let mut test_cases = Vec::with_capacity(dataset.len());
    let mut total_score = 0.0;
    let mut total_tau = 0.0;

    for (id, entry) in dataset.entries().iter().enumerate() {
        let model_answer = answerer
            .answer(&entry.question)
            .await
            .map_err(|source| BenchmarkError::Answer { case_id: id, source })?;

        let eval = evaluate_numeric(&model_answer, entry, &dataset);
        debug!(case = id, score = eval.score, kendall_tau = eval.kendall_tau, "scored numeric case");

        total_score += eval.score;
        total_tau += eval.kendall_tau;
        test_cases.push(NumericCaseResult {
            id,
            direction: entry.metadata.direction,
            question: entry.question.clone(),
            correct_answer: entry.answer.clone(),
            model_answer,
            parsed_values: eval.parsed_values,
            correct_values: eval.correct_values,
            score: eval.score,
            kendall_tau: eval.kendall_tau,
            kendall_p_value: eval.kendall_p_value,
        });
    }

    Ok(NumericBenchmarkResult {
        overall_score: mean_over(total_score, config.size),
        overall_kendall_tau: mean_over(total_tau, config.size),
        test_cases,
    })
}
