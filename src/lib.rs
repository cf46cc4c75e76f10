#![forbid(unsafe_code)]

//! # sortbench
//!
//! Measure how well LLMs sort.
//!
//! Two task families: attribute sorting (named items such as products or
//! cities ranked by price, population, ...) and plain number sorting. Each
//! dataset is generated from a seed with its ground truth attached. A model's
//! free-text answer is parsed back into an ordering and scored twice: an
//! exact-match score, and Kendall's tau-b with a p-value for partial credit.
//!
//! The model is anything implementing [`SortAnswerer`]; [`SortingClient`]
//! talks to OpenRouter or OpenAI through the [`gateway`].

pub mod attribute;
pub mod benchmark;
pub mod client;
pub mod config;
pub mod gateway;
pub mod numeric;
pub mod parser;
pub mod prompts;
pub mod scoring;
pub mod shuffler;
pub mod types;

pub use attribute::{evaluate_answer, AttributeQuestion, AttributeSorting, Category};
pub use benchmark::{
    run_attribute_benchmark, run_numeric_benchmark, AttributeBenchmarkResult, BenchmarkError,
    NumericBenchmarkResult,
};
pub use client::{AnswerError, FnAnswerer, SortAnswerer, SortingClient};
pub use config::{AttributeSortingConfig, ConfigError, NumberSortingConfig, NumericBenchmarkConfig};
pub use gateway::{Attribution, ChatGateway, ProviderGateway, UsageSink};
pub use numeric::{BaselineDataset, NumberSortingDataset};
pub use scoring::{kendall_tau, score_ordering, OrderingScore, RankCorrelation};
pub use shuffler::{ShuffleError, ShuffleStrategy, Shuffler};
pub use types::SortDirection;
