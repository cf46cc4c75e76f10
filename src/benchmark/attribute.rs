use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::attribute::{evaluate_answer, AttributeSorting, Category};
use crate::client::SortAnswerer;
use crate::config::AttributeSortingConfig;
use crate::types::SortDirection;

use super::{mean_over, BenchmarkError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeCaseResult {
    pub id: usize,
    pub category: Category,
    pub direction: SortDirection,
    pub question: String,
    pub correct_answer: String,
    pub model_answer: String,
    pub model_parsed_names: Vec<String>,
    pub correct_names: Vec<String>,
    pub binary_score: f64,
    pub kendall_tau: f64,
    pub kendall_p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeBenchmarkResult {
    pub overall_binary_score: f64,
    pub overall_kendall_tau: f64,
    pub test_cases: Vec<AttributeCaseResult>,
}

/// Generate the dataset described by `config` and score `answerer` on it.
pub async fn run_attribute_benchmark(
    answerer: &dyn SortAnswerer,
    config: &AttributeSortingConfig,
) -> Result<AttributeBenchmarkResult, BenchmarkError> {
    config.validate()?;
    let dataset = AttributeSorting::generate(config)?;
    info!(cases = dataset.len(), seed = config.seed, "running attribute benchmark");

    let mut test_cases = Vec::with_capacity(dataset.len());
    let mut total_binary = 0.0;
    let mut total_tau = 0.0;

    for (id, entry) in dataset.into_iter().enumerate() {
        let model_answer = answerer
            .answer(&entry.question)
            .await
            .map_err(|source| BenchmarkError::Answer { case_id: id, source })?;

        let eval = evaluate_answer(&model_answer, &entry);
        debug!(
            case = id,
            category = %entry.metadata.category,
            binary_score = eval.binary_score,
            kendall_tau = eval.kendall_tau,
            "scored attribute case"
        );

        total_binary += eval.binary_score;
        total_tau += eval.kendall_tau;
        test_cases.push(AttributeCaseResult {
            id,
            category: entry.metadata.category,
            direction: entry.metadata.direction,
            question: entry.question,
            correct_answer: entry.answer,
            model_answer,
            model_parsed_names: eval.model_names,
            correct_names: eval.correct_names,
            binary_score: eval.binary_score,
            kendall_tau: eval.kendall_tau,
            kendall_p_value: eval.kendall_p_value,
        });
    }

    Ok(AttributeBenchmarkResult {
        overall_binary_score: mean_over(total_binary, config.size),
        overall_kendall_tau: mean_over(total_tau, config.size),
        test_cases,
    })
}
