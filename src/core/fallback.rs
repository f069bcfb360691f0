use crate::models::{ScoredCandidate, RawRecommendation, RecommendationSource};
use std::collections::HashSet;

/// Reason attached to entries filled in from the hybrid ranking
pub const AUTO_FILL_REASON: &str = "auto-filled by ranking score";

/// Number of results the pipeline always tries to return
pub const MIN_RESULTS: usize = 3;

/// Top up reranker output from the hybrid-ranked window
///
/// Appends window candidates not already present, in window order, until
/// `min(min_results, window.len())` entries exist. Existing entries are left
/// untouched. Returns the number of entries appended.
pub fn complete_with_fallback(
    recommendations: &mut Vec<RawRecommendation>,
    window: &[ScoredCandidate],
    min_results: usize,
) -> usize {
    let target = min_results.min(window.len());
    if recommendations.len() >= target {
        return 0;
    }

    let mut present: HashSet<i64> = recommendations.iter().map(|r| r.item_id).collect();
    let before = recommendations.len();

    for candidate in window {
        if recommendations.len() >= target {
            break;
        }
        if !present.insert(candidate.item.id) {
            continue;
        }

        recommendations.push(RawRecommendation {
            item_id: candidate.item.id,
            item_name: candidate.item.name.clone(),
            reason: AUTO_FILL_REASON.to_string(),
            score: candidate.hybrid_score,
            match_points: Vec::new(),
            source: RecommendationSource::Fallback,
        });
    }

    recommendations.len() - before
}
