use crate::models::{PreferenceProfile, CatalogItem, ScoredCandidate, ScoringWeights, HybridWeights};
use crate::core::{scoring::calculate_match_score, similarity::semantic_score};
use std::cmp::Ordering;

/// Default size of the candidate window handed to the generative reranker
pub const DEFAULT_CANDIDATE_WINDOW: usize = 20;

/// Blends numeric and semantic scores and keeps the best candidates
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridRanker {
    weights: ScoringWeights,
    hybrid: HybridWeights,
}

impl HybridRanker {
    pub fn new(weights: ScoringWeights, hybrid: HybridWeights) -> Self {
        Self { weights, hybrid }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn hybrid_weights(&self) -> &HybridWeights {
        &self.hybrid
    }

    /// Score a single item
    pub fn score(
        &self,
        profile: &PreferenceProfile,
        user_embedding: Option<&[f32]>,
        item: &CatalogItem,
    ) -> (f64, f64, f64) {
        let numeric = calculate_match_score(profile, item, &self.weights);
        let semantic = semantic_score(user_embedding, item.embedding.as_deref());
        let hybrid = (self.hybrid.numeric * numeric + self.hybrid.semantic * semantic).clamp(0.0, 1.0);

        (numeric, semantic, hybrid)
    }

    /// Rank `items` by hybrid score and keep the top `window`
    ///
    /// # Ordering
    /// Hybrid score descending, then item id ascending so equal scores always
    /// come out in the same order.
    pub fn rank(
        &self,
        profile: &PreferenceProfile,
        user_embedding: Option<&[f32]>,
        items: &[CatalogItem],
        window: usize,
    ) -> Vec<ScoredCandidate> {
        // Score by reference first so only the kept window is cloned
        let mut scored: Vec<(&CatalogItem, f64, f64, f64)> = items
            .iter()
            .map(|item| {
                let (numeric, semantic, hybrid) = self.score(profile, user_embedding, item);
                (item, numeric, semantic, hybrid)
            })
            .collect();

        scored.sort_by(|a, b| compare_candidates(a.0.id, a.3, b.0.id, b.3));
        scored.truncate(window);

        scored
            .into_iter()
            .map(|(item, numeric_score, semantic_score, hybrid_score)| ScoredCandidate {
                item: item.clone(),
                numeric_score,
                semantic_score,
                hybrid_score,
            })
            .collect()
    }
}

#[inline]
fn compare_candidates(a_id: i64, a_score: f64, b_id: i64, b_score: f64) -> Ordering {
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_id.cmp(&b_id))
}
