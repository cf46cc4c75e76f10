//! Recover an ordering from a model's free-text answer.
//!
//! Parsing never fails. Whatever the text contains is returned in order of
//! appearance, duplicates and strays included; scoring decides what counts.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::attribute::category::Category;

static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    Category::ALL
        .iter()
        .map(|c| {
            Regex::new(&format!(r"{}\s+([A-Z])", regex::escape(c.name_prefix())))
                .expect("Invalid item name regex")
        })
        .collect()
});

static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?(?:\d+(?:\.\d+)?|\.\d+)").expect("Invalid number regex"));

/// Every `"<prefix> <uppercase letter>"` occurrence for `category`, left to
/// right, normalised to a single space between prefix and letter.
pub fn extract_ordered_names(answer: &str, category: Category) -> Vec<String> {
    let prefix = category.name_prefix();
    NAME_PATTERNS[category as usize]
        .captures_iter(answer)
        .filter_map(|caps| caps.get(1))
        .map(|letter| format!("{prefix} {}", letter.as_str()))
        .collect()
}

/// Every numeric token (optional minus sign, optional decimal part) as it
/// appears in the text.
pub fn extract_numbers(answer: &str) -> Vec<String> {
    NUMBER_PATTERN
        .find_iter(answer)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Numeric tokens converted to `f64`.
pub fn parse_numbers(answer: &str) -> Vec<f64> {
    NUMBER_PATTERN
        .find_iter(answer)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}
