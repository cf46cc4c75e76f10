//! Plain-text rendering of benchmark results.

use super::attribute::AttributeBenchmarkResult;
use super::numeric::NumericBenchmarkResult;

const RULE: &str = "--------------------------------------------------------------------------------";

/// Verbal band for a Kendall tau value.
pub fn interpret_tau(tau: f64) -> &'static str {
    if tau > 0.9 {
        "Perfect/Near-perfect sorting"
    } else if tau > 0.7 {
        "Strong agreement"
    } else if tau > 0.5 {
        "Moderate agreement"
    } else if tau > 0.3 {
        "Weak agreement"
    } else if tau > -0.3 {
        "Little to no correlation"
    } else if tau > -0.5 {
        "Weak disagreement"
    } else if tau > -0.7 {
        "Moderate disagreement"
    } else if tau > -0.9 {
        "Strong disagreement"
    } else {
        "Complete/Near-complete reversal"
    }
}

pub fn render_attribute_report(result: &AttributeBenchmarkResult) -> String {
    let mut out = String::new();
    out.push_str("=== Results ===\n");
    out.push_str(&format!(
        "Overall Binary Score: {:.2}%\n",
        result.overall_binary_score * 100.0
    ));
    out.push_str(&format!(
        "Overall Kendall Tau: {:.4}\n",
        result.overall_kendall_tau
    ));
    out.push_str(&format!("{RULE}\n"));

    for case in &result.test_cases {
        out.push_str(&format!(
            "Test Case {} ({}, {} order):\n",
            case.id, case.category, case.direction
        ));
        out.push_str(&format!("Question:\n{}\n\n", case.question));
        out.push_str(&format!("Correct Names: {:?}\n", case.correct_names));
        out.push_str(&format!("Model Parsed Names: {:?}\n", case.model_parsed_names));
        out.push_str(&format!("Raw Model Answer: {}\n", case.model_answer));
        out.push_str(&format!("Binary Score: {}\n", case.binary_score));
        out.push_str(&format!(
            "Kendall Tau: {:.4} (p-value: {:.4})\n",
            case.kendall_tau, case.kendall_p_value
        ));
        out.push_str(&format!("Interpretation: {}\n", interpret_tau(case.kendall_tau)));
        out.push_str(&format!("{RULE}\n"));
    }
    out
}

pub fn render_numeric_report(result: &NumericBenchmarkResult) -> String {
    let mut out = String::new();
    out.push_str("=== Results ===\n");
    out.push_str(&format!("Overall Score: {:.2}%\n", result.overall_score * 100.0));
    out.push_str(&format!(
        "Overall Kendall Tau: {:.4}\n",
        result.overall_kendall_tau
    ));
    out.push_str(&format!("{RULE}\n"));

    for case in &result.test_cases {
        out.push_str(&format!("Test Case {} ({} order):\n", case.id, case.direction));
        out.push_str(&format!("Question: {}\n", case.question));
        out.push_str(&format!("Model Answer: {}\n", case.model_answer));
        out.push_str(&format!("Correct Answer: {}\n", case.correct_answer));
        out.push_str(&format!("Parsed Values: {:?}\n", case.parsed_values));
        out.push_str(&format!("Correct Values: {:?}\n", case.correct_values));
        out.push_str(&format!("Score: {}\n", case.score));
        out.push_str(&format!(
            "Kendall Tau: {:.4} (p-value: {:.4})\n",
            case.kendall_tau, case.kendall_p_value
        ));
        out.push_str(&format!("{RULE}\n"));
    }
    out
}
