//! Score a model's answer to an attribute-sorting question.

use serde::{Deserialize, Serialize};

use crate::parser::extract_ordered_names;
use crate::scoring::score_ordering;

use super::generator::AttributeQuestion;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeEvaluation {
    pub binary_score: f64,
    pub kendall_tau: f64,
    pub kendall_p_value: f64,
    /// Names recovered from the answer, in the order they appeared.
    pub model_names: Vec<String>,
    pub correct_names: Vec<String>,
}

/// Parse item names out of `model_answer` and compare them with the
/// question's ground truth. Never fails: unparseable answers score zero.
pub fn evaluate_answer(model_answer: &str, entry: &AttributeQuestion) -> AttributeEvaluation {
    let model_names = extract_ordered_names(model_answer, entry.metadata.category);
    let correct_names = entry.metadata.correct_names();
    let score = score_ordering(&model_names, &correct_names);

    AttributeEvaluation {
        binary_score: score.binary_score,
        kendall_tau: score.kendall_tau,
        kendall_p_value: score.kendall_p_value,
        model_names,
        correct_names,
    }
}
