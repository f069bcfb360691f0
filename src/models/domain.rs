use serde::{Deserialize, Serialize};

/// A user's taste profile. Every field is optional; a missing field means
/// "no preference on this dimension".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// 1 (dry) to 5 (sweet)
    #[serde(default)]
    pub sweetness: Option<u8>,
    /// 1 (subtle) to 5 (rich)
    #[serde(default)]
    pub aroma: Option<u8>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(rename = "budgetMin", default)]
    pub budget_min: Option<u64>,
    #[serde(rename = "budgetMax", default)]
    pub budget_max: Option<u64>,
    #[serde(rename = "freeText", default)]
    pub free_text: Option<String>,
}

impl PreferenceProfile {
    /// Requested region, treating an empty string as "not requested"
    pub fn requested_region(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.is_empty())
    }
}

/// A catalog entry as supplied by the catalog store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub sweetness: Option<u8>,
    #[serde(default)]
    pub aroma: Option<u8>,
    #[serde(rename = "priceDescriptor", alias = "priceRange", default)]
    pub price_descriptor: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl CatalogItem {
    /// Item region, treating an empty string as "not supplied"
    pub fn known_region(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.is_empty())
    }
}

/// A catalog item with the scores the hybrid ranker computed for it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub item: CatalogItem,
    pub numeric_score: f64,
    pub semantic_score: f64,
    pub hybrid_score: f64,
}

/// Which pipeline stage produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Generative,
    Fallback,
}

/// A single recommendation as proposed by the reranker or the fallback
/// completer, before it is resolved against the candidate window.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecommendation {
    pub item_id: i64,
    pub item_name: String,
    pub reason: String,
    pub score: f64,
    pub match_points: Vec<String>,
    pub source: RecommendationSource,
}

/// Final recommendation with score provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    #[serde(rename = "itemId")]
    pub item_id: i64,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub reason: String,
    pub score: f64,
    #[serde(rename = "matchPoints")]
    pub match_points: Vec<String>,
    #[serde(rename = "numericScore")]
    pub numeric_score: f64,
    #[serde(rename = "semanticScore")]
    pub semantic_score: f64,
    #[serde(rename = "hybridScore")]
    pub hybrid_score: f64,
    pub source: RecommendationSource,
}

/// Attribute weights for the numeric match scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub sweetness: f64,
    pub aroma: f64,
    pub region: f64,
    pub budget: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            sweetness: 0.4,
            aroma: 0.3,
            region: 0.2,
            budget: 0.1,
        }
    }
}

/// Blend of numeric and semantic scores in the hybrid score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridWeights {
    pub numeric: f64,
    pub semantic: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            numeric: 0.4,
            semantic: 0.6,
        }
    }
}
