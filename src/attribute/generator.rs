//! Synthetic attribute-sorting questions with known ground truth.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{resolve_categories, validate_items_range, AttributeSortingConfig, ConfigError};
use crate::types::{list_literal, stable_sorted, SortDirection};

use super::category::Category;

/// A named item carrying the attribute value it is ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub value: f64,
    /// Line shown in the question, e.g. `Product A: $12.34`.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    pub category: Category,
    pub direction: SortDirection,
    /// Items in generation (letter) order.
    pub items: Vec<Item>,
    /// Items in the correct order for `direction`.
    pub sorted_items: Vec<Item>,
}

impl AttributeMetadata {
    pub fn correct_names(&self) -> Vec<String> {
        self.sorted_items.iter().map(|i| i.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeQuestion {
    pub question: String,
    /// Canonical answer text: the list literal of the sorted names.
    pub answer: String,
    pub metadata: AttributeMetadata,
}

/// Seeded generator of attribute-sorting questions.
///
/// All randomness comes from the one `StdRng` owned by the generator, so the
/// same seed and parameters always reproduce the same dataset.
#[derive(Debug, Clone)]
pub struct AttributeSorting {
    rng: StdRng,
}

impl AttributeSorting {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate the dataset described by `config` (including its seed).
    pub fn generate(config: &AttributeSortingConfig) -> Result<Vec<AttributeQuestion>, ConfigError> {
        Self::new(config.seed).generate_dataset(
            config.size,
            config.items_per_question,
            config.categories.as_deref(),
        )
    }

    /// Generate `size` questions, each over an item count drawn from the
    /// inclusive `items_per_question` range and a category from `categories`
    /// (all categories when `None`).
    pub fn generate_dataset<S: AsRef<str>>(
        &mut self,
        size: usize,
        items_per_question: (usize, usize),
        categories: Option<&[S]>,
    ) -> Result<Vec<AttributeQuestion>, ConfigError> {
        validate_items_range(items_per_question)?;
        let categories = resolve_categories(categories)?;

        Ok((0..size)
            .map(|_| self.generate_question(&categories, items_per_question))
            .collect())
    }

    fn generate_question(
        &mut self,
        categories: &[Category],
        (min_items, max_items): (usize, usize),
    ) -> AttributeQuestion {
        let category = categories[self.rng.gen_range(0..categories.len())];
        let direction = SortDirection::random(&mut self.rng);
        let num_items = self.rng.gen_range(min_items..=max_items);

        let items: Vec<Item> = (0..num_items)
            .filter_map(|i| {
                let value = category.sample_value(&mut self.rng);
                let name = category.item_name(i)?;
                let text = category.render_item(&name, value);
                Some(Item { name, value, text })
            })
            .collect();

        let mut question = category.prompt(direction);
        for item in &items {
            question.push('\n');
            question.push_str(&item.text);
        }

        let sorted_items = stable_sorted(&items, direction, |item| item.value);
        let names: Vec<&str> = sorted_items.iter().map(|i| i.name.as_str()).collect();
        let answer = list_literal(&names);

        AttributeQuestion {
            question,
            answer,
            metadata: AttributeMetadata {
                category,
                direction,
                items,
                sorted_items,
            },
        }
    }
}
