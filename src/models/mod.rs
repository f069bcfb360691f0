// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CatalogItem, HybridWeights, PreferenceProfile, RawRecommendation, RecommendationResult,
    RecommendationSource, ScoredCandidate, ScoringWeights,
};
pub use requests::RecommendRequest;
pub use responses::{ErrorResponse, HealthResponse, RecommendResponse};
