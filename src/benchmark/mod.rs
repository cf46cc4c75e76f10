//! Benchmark runners: generate a dataset, ask the model, score every answer.
//!
//! Runs are sequential. A failed answer aborts the run with the id of the
//! case that failed; there is no retry at this layer (the gateway owns that).

pub mod attribute;
pub mod numeric;
pub mod report;

use crate::client::AnswerError;
use crate::config::ConfigError;

pub use attribute::{run_attribute_benchmark, AttributeBenchmarkResult, AttributeCaseResult};
pub use numeric::{run_numeric_benchmark, NumericBenchmarkResult, NumericCaseResult};
pub use report::{interpret_tau, render_attribute_report, render_numeric_report};

#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    #[error("invalid benchmark config: {0}")]
    Config(#[from] ConfigError),
    #[error("case {case_id}: {source}")]
    Answer {
        case_id: usize,
        #[source]
        source: AnswerError,
    },
}

/// Sum divided by the intended case count; zero for an empty run.
fn mean_over(total: f64, size: usize) -> f64 {
    if size == 0 {
        0.0
    } else {
        total / size as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_run_is_zero() {
        assert_eq!(mean_over(0.0, 0), 0.0);
        assert_eq!(mean_over(3.0, 4), 0.75);
    }
}
