//! Sake Recommender - hybrid recommendation service for Japanese sake
//!
//! This library provides the ranking pipeline behind the recommendation API.
//! Items are scored on taste attributes and embedding similarity, the best
//! candidates are re-ranked and explained by a language model, and a
//! deterministic fallback guarantees a usable list when that model fails.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{HybridRanker, PipelineOptions, RecommendError, RecommendationRun, Recommender};
pub use models::{CatalogItem, HybridWeights, PreferenceProfile, RecommendationResult, ScoringWeights};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let ranker = HybridRanker::default();
        assert_eq!(ranker.hybrid_weights(), &HybridWeights::default());
        assert_eq!(crate::core::parse_price_range("3000-5000円"), (Some(3000), Some(5000)));
    }
}
