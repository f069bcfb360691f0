use crate::models::{PreferenceProfile, CatalogItem, ScoringWeights};
use crate::core::price::parse_price_range;

/// Widest possible gap between two levels on the 1-5 scale
const LEVEL_SPAN: f64 = 4.0;

/// Calculate a numeric match score (0-1) for an item against a preference profile
///
/// Scoring formula, normalized by the weights actually applied:
/// score = (
///     sweetness_closeness * 0.4 +  # both levels present
///     aroma_closeness * 0.3 +      # both levels present
///     region_bonus * 0.2 +         # region requested and item region known
///     budget_bonus * 0.1           # any budget or price bound known
/// ) / applied_weight
///
/// A dimension whose inputs are missing is skipped entirely. When nothing is
/// comparable the score is 0.0.
pub fn calculate_match_score(
    profile: &PreferenceProfile,
    item: &CatalogItem,
    weights: &ScoringWeights,
) -> f64 {
    let mut total = 0.0;
    let mut applied = 0.0;

    // Sweetness
    if let (Some(wanted), Some(actual)) = (profile.sweetness, item.sweetness) {
        total += weights.sweetness * level_closeness(wanted, actual);
        applied += weights.sweetness;
    }

    // Aroma
    if let (Some(wanted), Some(actual)) = (profile.aroma, item.aroma) {
        total += weights.aroma * level_closeness(wanted, actual);
        applied += weights.aroma;
    }

    // Region
    if let (Some(wanted), Some(actual)) = (profile.requested_region(), item.known_region()) {
        if regions_overlap(wanted, actual) {
            total += weights.region;
        }
        applied += weights.region;
    }

    // Budget
    let (price_min, price_max) = item
        .price_descriptor
        .as_deref()
        .map(parse_price_range)
        .unwrap_or((None, None));

    let budget_known = profile.budget_min.is_some()
        || profile.budget_max.is_some()
        || price_min.is_some()
        || price_max.is_some();

    if budget_known {
        if !budget_conflicts(profile, price_min, price_max) {
            total += weights.budget;
        }
        applied += weights.budget;
    }

    if applied <= 0.0 {
        return 0.0;
    }

    let score = total / applied;
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Closeness (0-1) of two levels on the 1-5 scale
#[inline]
fn level_closeness(wanted: u8, actual: u8) -> f64 {
    let gap = (wanted as f64 - actual as f64).abs();
    (1.0 - gap / LEVEL_SPAN).max(0.0)
}

/// Case-sensitive containment in either direction
#[inline]
fn regions_overlap(wanted: &str, actual: &str) -> bool {
    actual.contains(wanted) || wanted.contains(actual)
}

/// A conflict is only proven when both sides of a comparison are known
#[inline]
fn budget_conflicts(profile: &PreferenceProfile, price_min: Option<u64>, price_max: Option<u64>) -> bool {
    let over_budget = matches!(
        (profile.budget_max, price_min),
        (Some(budget_max), Some(price_min)) if price_min > budget_max
    );
    let under_budget = matches!(
        (profile.budget_min, price_max),
        (Some(budget_min), Some(price_max)) if price_max < budget_min
    );

    over_budget || under_budget
}
