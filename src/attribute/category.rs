//! The closed set of item categories for attribute-sorting questions.
//!
//! Each category is a row in a static table: how items are named, which
//! attribute they are ranked by, how values are drawn and how they are shown.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Items are named `"<prefix> A"` … `"<prefix> Z"`, so a question holds at most
/// one item per uppercase letter.
pub const MAX_ITEMS_PER_QUESTION: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Products,
    Students,
    Restaurants,
    Cities,
}

/// How a category's attribute values are sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueDistribution {
    /// Uniform float in `[low, high]`, rounded to `decimals` places.
    Uniform { low: f64, high: f64, decimals: i32 },
    /// Uniform integer in `[low, high]`.
    Integer { low: i64, high: i64 },
}

impl ValueDistribution {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            ValueDistribution::Uniform { low, high, decimals } => {
                round_to(rng.gen_range(low..=high), decimals)
            }
            ValueDistribution::Integer { low, high } => rng.gen_range(low..=high) as f64,
        }
    }
}

/// How an item line is rendered in the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFormat {
    /// `Product A: $12.34`
    Currency,
    /// `Student A: 56.7`
    OneDecimal,
    /// `Restaurant A: 4.2 stars`
    Stars,
    /// `City A: 1,234,567 people`
    People,
}

impl DisplayFormat {
    pub fn render(&self, name: &str, value: f64) -> String {
        match self {
            DisplayFormat::Currency => format!("{name}: ${value:.2}"),
            DisplayFormat::OneDecimal => format!("{name}: {value:.1}"),
            DisplayFormat::Stars => format!("{name}: {value:.1} stars"),
            DisplayFormat::People => {
                format!("{name}: {} people", group_thousands(value.round() as i64))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    /// Config/metadata key, also the plural used in the prompt.
    pub key: &'static str,
    pub name_prefix: &'static str,
    pub attribute_name: &'static str,
    /// Attribute as worded in the prompt ("test score" for students).
    pub attribute_phrase: &'static str,
    pub distribution: ValueDistribution,
    pub display: DisplayFormat,
}

const SPECS: [CategorySpec; 4] = [
    CategorySpec {
        key: "products",
        name_prefix: "Product",
        attribute_name: "price",
        attribute_phrase: "price",
        distribution: ValueDistribution::Uniform {
            low: 1.99,
            high: 999.99,
            decimals: 2,
        },
        display: DisplayFormat::Currency,
    },
    CategorySpec {
        key: "students",
        name_prefix: "Student",
        attribute_name: "score",
        attribute_phrase: "test score",
        distribution: ValueDistribution::Uniform {
            low: 0.0,
            high: 100.0,
            decimals: 1,
        },
        display: DisplayFormat::OneDecimal,
    },
    CategorySpec {
        key: "restaurants",
        name_prefix: "Restaurant",
        attribute_name: "rating",
        attribute_phrase: "rating",
        distribution: ValueDistribution::Uniform {
            low: 1.0,
            high: 5.0,
            decimals: 1,
        },
        display: DisplayFormat::Stars,
    },
    CategorySpec {
        key: "cities",
        name_prefix: "City",
        attribute_name: "population",
        attribute_phrase: "population",
        distribution: ValueDistribution::Integer {
            low: 10_000,
            high: 10_000_000,
        },
        display: DisplayFormat::People,
    },
];

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Products,
        Category::Students,
        Category::Restaurants,
        Category::Cities,
    ];

    pub fn spec(self) -> &'static CategorySpec {
        &SPECS[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn name_prefix(self) -> &'static str {
        self.spec().name_prefix
    }

    pub fn attribute_name(self) -> &'static str {
        self.spec().attribute_name
    }

    pub fn keys() -> Vec<&'static str> {
        SPECS.iter().map(|s| s.key).collect()
    }

    /// Name of the `index`-th item (0 → "A"), `None` past the alphabet.
    pub fn item_name(self, index: usize) -> Option<String> {
        if index >= MAX_ITEMS_PER_QUESTION {
            return None;
        }
        let letter = char::from(b'A' + index as u8);
        Some(format!("{} {letter}", self.name_prefix()))
    }

    /// Directional instruction line opening the question.
    pub fn prompt(self, direction: impl fmt::Display) -> String {
        let spec = self.spec();
        format!(
            "Sort these {} by their {} in {direction} order:",
            spec.key, spec.attribute_phrase
        )
    }

    pub fn sample_value<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        self.spec().distribution.sample(rng)
    }

    pub fn render_item(self, name: &str, value: f64) -> String {
        self.spec().display.render(name, value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| ConfigError::UnknownCategory {
                name: s.to_string(),
                available: Category::keys(),
            })
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
