//! Attribute sorting: named items ranked by a category-specific attribute.

pub mod category;
pub mod evaluate;
pub mod generator;

pub use category::{Category, MAX_ITEMS_PER_QUESTION};
pub use evaluate::{evaluate_answer, AttributeEvaluation};
pub use generator::{AttributeMetadata, AttributeQuestion, AttributeSorting, Item};
