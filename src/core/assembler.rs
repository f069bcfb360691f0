use crate::models::{ScoredCandidate, RawRecommendation, RecommendationResult};
use std::collections::{HashMap, HashSet};

/// Resolve recommendations against the candidate window
///
/// Keeps the incoming order, drops entries whose id is not in the window or
/// was already emitted, and stops at `max_results`. The display score is the
/// recommendation's own score; the candidate's scores are attached as
/// provenance.
pub fn assemble_results(
    recommendations: Vec<RawRecommendation>,
    window: &[ScoredCandidate],
    max_results: usize,
) -> Vec<RecommendationResult> {
    let by_id: HashMap<i64, &ScoredCandidate> = window.iter().map(|c| (c.item.id, c)).collect();
    let mut emitted = HashSet::new();

    recommendations
        .into_iter()
        .filter_map(|rec| {
            let candidate = by_id.get(&rec.item_id)?;
            if !emitted.insert(rec.item_id) {
                return None;
            }

            let display_name = if rec.item_name.trim().is_empty() {
                candidate.item.name.clone()
            } else {
                rec.item_name
            };

            Some(RecommendationResult {
                item_id: rec.item_id,
                display_name,
                reason: rec.reason,
                score: rec.score.clamp(0.0, 1.0),
                match_points: rec.match_points,
                numeric_score: candidate.numeric_score,
                semantic_score: candidate.semantic_score,
                hybrid_score: candidate.hybrid_score,
                source: rec.source,
            })
        })
        .take(max_results)
        .collect()
}
