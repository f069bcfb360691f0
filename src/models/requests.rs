use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::PreferenceProfile;

/// Request to generate recommendations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(range(min = 1, max = 5))]
    #[serde(alias = "preferred_sweetness", rename = "preferredSweetness", default)]
    pub preferred_sweetness: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    #[serde(alias = "preferred_aroma", rename = "preferredAroma", default)]
    pub preferred_aroma: Option<u8>,
    #[serde(alias = "preferred_region", rename = "preferredRegion", default)]
    pub preferred_region: Option<String>,
    #[serde(alias = "budget_min", rename = "budgetMin", default)]
    pub budget_min: Option<u64>,
    #[serde(alias = "budget_max", rename = "budgetMax", default)]
    pub budget_max: Option<u64>,
    #[serde(alias = "additional_preferences", rename = "additionalPreferences", default)]
    pub additional_preferences: Option<String>,
    #[validate(range(min = 1, max = 50))]
    #[serde(alias = "max_results", rename = "maxResults", default)]
    pub max_results: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    #[serde(alias = "candidate_window", rename = "candidateWindow", default)]
    pub candidate_window: Option<usize>,
}

impl RecommendRequest {
    /// Preference profile carried by this request
    pub fn profile(&self) -> PreferenceProfile {
        PreferenceProfile {
            sweetness: self.preferred_sweetness,
            aroma: self.preferred_aroma,
            region: self.preferred_region.clone(),
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            free_text: self.additional_preferences.clone(),
        }
    }
}
