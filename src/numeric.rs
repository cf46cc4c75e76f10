//! Baseline numeric sorting: lists of decimal numbers with a scoring oracle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, NumberSortingConfig};
use crate::parser::parse_numbers;
use crate::scoring::rank_correlation;
use crate::types::{list_literal, stable_sorted, SortDirection};

const EXAMPLE_ANSWER: &str = "['-69', '-13', '1', '7', '11', '43', '59', '61']";

/// A dataset that owns its ground truth and knows how to grade answers.
pub trait BaselineDataset {
    type Entry;

    fn entries(&self) -> &[Self::Entry];

    /// Score in `[0, 1]` for `answer` against `entry`.
    fn score_answer(&self, answer: &str, entry: &Self::Entry) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericMetadata {
    /// Numbers as displayed in the question, in question order.
    pub original_numbers: Vec<String>,
    pub direction: SortDirection,
    pub sorted_numbers: Vec<String>,
}

impl NumericMetadata {
    pub fn sorted_values(&self) -> Vec<f64> {
        self.sorted_numbers
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericEntry {
    pub question: String,
    pub answer: String,
    pub metadata: NumericMetadata,
}

#[derive(Debug, Clone)]
pub struct NumberSortingDataset {
    entries: Vec<NumericEntry>,
}

impl NumberSortingDataset {
    /// Build `size` entries. Entry `i` draws from its own generator seeded
    /// with `seed + i`, so any entry can be regenerated on its own.
    pub fn create(config: &NumberSortingConfig, size: usize, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let entries = (0..size)
            .map(|i| generate_entry(config, &mut StdRng::seed_from_u64(seed.wrapping_add(i as u64))))
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BaselineDataset for NumberSortingDataset {
    type Entry = NumericEntry;

    fn entries(&self) -> &[NumericEntry] {
        &self.entries
    }

    fn score_answer(&self, answer: &str, entry: &NumericEntry) -> f64 {
        let parsed = parse_numbers(answer);
        if parsed == entry.metadata.sorted_values() {
            1.0
        } else {
            0.0
        }
    }
}

fn generate_entry(config: &NumberSortingConfig, rng: &mut StdRng) -> NumericEntry {
    let count = rng.gen_range(config.min_numbers..=config.max_numbers);
    let decimals = rng.gen_range(config.min_decimals..=config.max_decimals);

    let numbers: Vec<(String, f64)> = (0..count)
        .map(|_| {
            let raw = rng.gen_range(config.min_value..=config.max_value);
            let text = format!("{raw:.decimals$}");
            // The displayed string is the ground truth, not the raw draw.
            let value = text.parse().unwrap_or(raw);
            (text, value)
        })
        .collect();
    let direction = SortDirection::random(rng);

    let sorted = stable_sorted(&numbers, direction, |n| n.1);
    let original_numbers: Vec<String> = numbers.into_iter().map(|n| n.0).collect();
    let sorted_numbers: Vec<String> = sorted.into_iter().map(|n| n.0).collect();

    let question = format!(
        "Sort these numbers in {direction} order: {}\n\
         Please follow the instruction below:\n\
         ## 1. Let all your answers be a list of numbers. Instead of reporting your answer as \
         -69, -13, 1, 7, 11, 43, 59, 61, use {EXAMPLE_ANSWER} instead\n\
         ## 2. Convert all numbers in the square brackets as strings. For example, {EXAMPLE_ANSWER}",
        original_numbers.join(", ")
    );

    NumericEntry {
        question,
        answer: list_literal(&sorted_numbers),
        metadata: NumericMetadata {
            original_numbers,
            direction,
            sorted_numbers,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericEvaluation {
    pub score: f64,
    pub kendall_tau: f64,
    pub kendall_p_value: f64,
    pub parsed_values: Vec<f64>,
    pub correct_values: Vec<f64>,
}

/// Grade with the dataset oracle, then add rank agreement over the parsed
/// values.
pub fn evaluate_numeric<D>(answer: &str, entry: &NumericEntry, dataset: &D) -> NumericEvaluation
where
    D: BaselineDataset<Entry = NumericEntry> + ?Sized,
{
    let score = dataset.score_answer(answer, entry);
    let parsed_values = parse_numbers(answer);
    let correct_values = entry.metadata.sorted_values();
    let correlation = rank_correlation(&parsed_values, &correct_values, score);

    NumericEvaluation {
        score,
        kendall_tau: correlation.tau,
        kendall_p_value: correlation.p_value,
        parsed_values,
        correct_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(size: usize, seed: u64) -> NumberSortingDataset {
        NumberSortingDataset::create(&NumberSortingConfig::default(), size, seed).unwrap()
    }

    #[test]
    fn entries_respect_config_bounds() {
        let config = NumberSortingConfig::default();
        let data = dataset(50, 42);
        assert_eq!(data.len(), 50);
        for entry in data.entries() {
            let meta = &entry.metadata;
            let n = meta.original_numbers.len();
            assert!((config.min_numbers..=config.max_numbers).contains(&n));
            assert_eq!(meta.sorted_numbers.len(), n);
            for s in &meta.original_numbers {
                let v: f64 = s.parse().unwrap();
                assert!(v >= -100.0 && v <= 100.0, "{s}");
                let decimals = s.split('.').nth(1).map_or(0, str::len);
                assert!(decimals <= config.max_decimals);
            }
        }
    }

    #[test]
    fn sorted_numbers_follow_direction() {
        for entry in dataset(30, 7).entries() {
            let values = entry.metadata.sorted_values();
            for pair in values.windows(2) {
                match entry.metadata.direction {
                    SortDirection::Ascending => assert!(pair[0] <= pair[1]),
                    SortDirection::Descending => assert!(pair[0] >= pair[1]),
                }
            }
        }
    }

    #[test]
    fn entries_are_independent_of_dataset_size() {
        let small = dataset(3, 11);
        let large = dataset(10, 11);
        assert_eq!(small.entries(), &large.entries()[..3]);

        // Entry i of seed s is entry 0 of seed s + i.
        let shifted = dataset(1, 13);
        assert_eq!(shifted.entries()[0], large.entries()[2]);
    }

    #[test]
    fn question_lists_the_numbers_and_instructions() {
        let data = dataset(1, 1);
        let entry = &data.entries()[0];
        let first_line = entry.question.lines().next().unwrap();
        assert_eq!(
            first_line,
            format!(
                "Sort these numbers in {} order: {}",
                entry.metadata.direction,
                entry.metadata.original_numbers.join(", ")
            )
        );
        assert!(entry.question.contains("Convert all numbers in the square brackets as strings"));
        assert_eq!(entry.answer, list_literal(&entry.metadata.sorted_numbers));
    }

    #[test]
    fn oracle_accepts_only_the_exact_order() {
        let data = dataset(5, 3);
        for entry in data.entries() {
            assert_eq!(data.score_answer(&entry.answer, entry), 1.0);
            let mut wrong = entry.metadata.sorted_numbers.clone();
            wrong.pop();
            assert_eq!(data.score_answer(&list_literal(&wrong), entry), 0.0);
        }
    }

    #[test]
    fn evaluation_reports_reversal() {
        let config = NumberSortingConfig {
            min_numbers: 5,
            max_numbers: 5,
            min_decimals: 0,
            max_decimals: 0,
            min_value: 0.0,
            max_value: 1_000_000.0,
        };
        let data = NumberSortingDataset::create(&config, 1, 99).unwrap();
        let entry = &data.entries()[0];

        let mut reversed = entry.metadata.sorted_numbers.clone();
        reversed.reverse();
        let eval = evaluate_numeric(&list_literal(&reversed), entry, &data);
        assert_eq!(eval.score, 0.0);
        assert_eq!(eval.kendall_tau, -1.0);

        let eval = evaluate_numeric(&entry.answer, entry, &data);
        assert_eq!(eval.score, 1.0);
        assert_eq!(eval.kendall_tau, 1.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = NumberSortingConfig {
            min_numbers: 5,
            max_numbers: 2,
            ..NumberSortingConfig::default()
        };
        assert!(NumberSortingDataset::create(&config, 1, 0).is_err());
    }
}
