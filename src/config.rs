//! Benchmark configuration.
//!
//! Every config struct has serde defaults so a JSON file only needs the keys it
//! wants to override. Validation runs before any dataset is generated.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::attribute::category::{Category, MAX_ITEMS_PER_QUESTION};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown category: {name}. Available categories: {available:?}")]
    UnknownCategory {
        name: String,
        available: Vec<&'static str>,
    },
    #[error("category list is empty")]
    EmptyCategories,
    #[error("invalid range for {field}: min {min} > max {max}")]
    InvalidRange {
        field: &'static str,
        min: String,
        max: String,
    },
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: usize,
        value: usize,
    },
    #[error("at most {limit} items per question are supported (one letter each), got {requested}")]
    TooManyItems { requested: usize, limit: usize },
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Options for the attribute-sorting benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeSortingConfig {
    /// Number of questions.
    pub size: usize,
    /// Inclusive (min, max) number of items per question.
    pub items_per_question: (usize, usize),
    /// Category names to draw from; `None` means all categories.
    pub categories: Option<Vec<String>>,
    pub seed: u64,
}

impl Default for AttributeSortingConfig {
    fn default() -> Self {
        Self {
            size: 10,
            items_per_question: (4, 8),
            categories: None,
            seed: 42,
        }
    }
}

impl AttributeSortingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_items_range(self.items_per_question)?;
        resolve_categories(self.categories.as_deref())?;
        Ok(())
    }
}

/// Check an items-per-question range against the one-letter-per-item naming.
pub fn validate_items_range((min, max): (usize, usize)) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidRange {
            field: "items_per_question",
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    if min < 1 {
        return Err(ConfigError::BelowMinimum {
            field: "items_per_question",
            min: 1,
            value: min,
        });
    }
    if max > MAX_ITEMS_PER_QUESTION {
        return Err(ConfigError::TooManyItems {
            requested: max,
            limit: MAX_ITEMS_PER_QUESTION,
        });
    }
    Ok(())
}

/// Resolve category names, `None` meaning every category in table order.
pub fn resolve_categories<S: AsRef<str>>(
    names: Option<&[S]>,
) -> Result<Vec<Category>, ConfigError> {
    let Some(names) = names else {
        return Ok(Category::ALL.to_vec());
    };
    if names.is_empty() {
        return Err(ConfigError::EmptyCategories);
    }
    names.iter().map(|n| n.as_ref().parse()).collect()
}

/// Generation options of the baseline numeric-sorting dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberSortingConfig {
    pub min_numbers: usize,
    pub max_numbers: usize,
    pub min_decimals: usize,
    pub max_decimals: usize,
    pub min_value: f64,
    pub max_value: f64,
}

impl Default for NumberSortingConfig {
    fn default() -> Self {
        Self {
            min_numbers: 3,
            max_numbers: 10,
            min_decimals: 0,
            max_decimals: 2,
            min_value: -100.0,
            max_value: 100.0,
        }
    }
}

impl NumberSortingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_numbers < 1 {
            return Err(ConfigError::BelowMinimum {
                field: "min_numbers",
                min: 1,
                value: self.min_numbers,
            });
        }
        check_order("numbers", self.min_numbers, self.max_numbers)?;
        check_order("decimals", self.min_decimals, self.max_decimals)?;
        if !self.min_value.is_finite() {
            return Err(ConfigError::NonFinite { field: "min_value" });
        }
        if !self.max_value.is_finite() {
            return Err(ConfigError::NonFinite { field: "max_value" });
        }
        check_order("value", self.min_value, self.max_value)?;
        Ok(())
    }
}

fn check_order<T: PartialOrd + ToString>(field: &'static str, min: T, max: T) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Options for the numeric-sorting benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericBenchmarkConfig {
    pub size: usize,
    pub seed: u64,
    #[serde(flatten)]
    pub sorting: NumberSortingConfig,
}

impl Default for NumericBenchmarkConfig {
    fn default() -> Self {
        Self {
            size: 100,
            seed: 42,
            sorting: NumberSortingConfig::default(),
        }
    }
}

/// Load a JSON config file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        path: display,
        source,
    })
}
