use crate::models::PreferenceProfile;
use crate::services::{EmbeddingService, EmbeddingError};
use std::sync::Arc;
use std::time::Duration;

/// Rendered in place of any missing preference field
const UNSPECIFIED: &str = "指定なし";

/// Serialize a preference profile into the text that gets embedded
///
/// Every field is always rendered, in a fixed order, so equal profiles produce
/// identical text and therefore identical embeddings.
pub fn preference_text(profile: &PreferenceProfile) -> String {
    fn level(value: Option<u8>) -> String {
        value.map_or_else(|| UNSPECIFIED.to_string(), |v| v.to_string())
    }

    fn amount(value: Option<u64>) -> String {
        value.map_or_else(|| UNSPECIFIED.to_string(), |v| format!("{}円", v))
    }

    fn text(value: Option<&str>) -> &str {
        value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(UNSPECIFIED)
    }

    format!(
        "好みの甘さ: {} (1:辛口 〜 5:甘口)\n\
         好みの香り: {} (1:控えめ 〜 5:芳醇)\n\
         好みの地域: {}\n\
         予算: {} 〜 {}\n\
         その他の希望: {}",
        level(profile.sweetness),
        level(profile.aroma),
        text(profile.region.as_deref()),
        amount(profile.budget_min),
        amount(profile.budget_max),
        text(profile.free_text.as_deref()),
    )
}

/// Builds the user-side embedding for semantic scoring
#[derive(Clone)]
pub struct PreferenceEmbedder {
    service: Arc<dyn EmbeddingService>,
    timeout: Duration,
}

impl PreferenceEmbedder {
    pub fn new(service: Arc<dyn EmbeddingService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Embed the profile, surfacing the reason on failure
    pub async fn try_embed(&self, profile: &PreferenceProfile) -> Result<Vec<f32>, EmbeddingError> {
        let text = preference_text(profile);

        match tokio::time::timeout(self.timeout, self.service.embed(&text)).await {
            Ok(result) => result,
            Err(_) => Err(EmbeddingError::Timeout(self.timeout)),
        }
    }

    /// Embed the profile; any failure degrades to `None`
    pub async fn embed(&self, profile: &PreferenceProfile) -> Option<Vec<f32>> {
        match self.try_embed(profile).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                tracing::warn!("Preference embedding unavailable, semantic scoring disabled: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_text_is_stable() {
        let profile = PreferenceProfile {
            sweetness: Some(3),
            aroma: None,
            region: Some("新潟県".to_string()),
            budget_min: Some(1000),
            budget_max: None,
            free_text: Some("  ".to_string()),
        };

        let text = preference_text(&profile);
        assert_eq!(text, preference_text(&profile.clone()));
        assert!(text.contains("好みの甘さ: 3"));
        assert!(text.contains("好みの香り: 指定なし"));
        assert!(text.contains("予算: 1000円 〜 指定なし"));
        assert!(text.ends_with("その他の希望: 指定なし"));
    }

    #[test]
    fn test_missing_fields_are_rendered() {
        let text = preference_text(&PreferenceProfile::default());
        assert_eq!(text.lines().count(), 5);
        assert_eq!(text.matches(UNSPECIFIED).count(), 6);
    }
}
