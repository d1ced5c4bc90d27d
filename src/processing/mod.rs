//! Matching engine: embeddings, scoring and the rule-based assessors

pub mod career;
pub mod competition;
pub mod decision;
pub mod detector;
pub mod embedding_manager;
pub mod embeddings;
pub mod engine;
pub mod explainer;
pub mod matcher;
pub mod scoring;
pub mod skills;

pub use embeddings::{EmbeddingProvider, Model2VecProvider, ProviderHandle, ProviderSlot};
pub use engine::MatchEngine;
pub use matcher::SemanticMatcher;
