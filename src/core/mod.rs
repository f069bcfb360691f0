// Core algorithm exports
pub mod assembler;
pub mod embedding;
pub mod fallback;
pub mod price;
pub mod ranker;
pub mod recommender;
pub mod rerank;
pub mod scoring;
pub mod similarity;

pub use assembler::assemble_results;
pub use embedding::{preference_text, PreferenceEmbedder};
pub use fallback::{complete_with_fallback, AUTO_FILL_REASON, MIN_RESULTS};
pub use price::parse_price_range;
pub use ranker::{HybridRanker, DEFAULT_CANDIDATE_WINDOW};
pub use recommender::{PipelineOptions, RecommendError, RecommendationRun, Recommender};
pub use rerank::{
    build_prompt, parse_response, repair_json, GenerativeReranker, ParsedResponse, RerankFailure,
};
pub use scoring::calculate_match_score;
pub use similarity::{cosine_similarity, normalize_similarity, semantic_score};
