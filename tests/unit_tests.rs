// Unit tests for the scoring primitives

use sake_recommender::core::{
    calculate_match_score, cosine_similarity, normalize_similarity, parse_price_range,
    preference_text, repair_json, HybridRanker, DEFAULT_CANDIDATE_WINDOW,
};
use sake_recommender::models::{PreferenceProfile, CatalogItem, ScoringWeights, HybridWeights};

fn create_item(id: i64) -> CatalogItem {
    CatalogItem {
        id,
        name: format!("Sake {}", id),
        category: "普通酒".to_string(),
        region: None,
        sweetness: None,
        aroma: None,
        price_descriptor: None,
        description: None,
        embedding: None,
    }
}

#[test]
fn test_price_range_examples() {
    assert_eq!(parse_price_range("3000-5000円"), (Some(3000), Some(5000)));
    assert_eq!(parse_price_range(""), (None, None));
    assert_eq!(parse_price_range("no numbers"), (None, None));
}

#[test]
fn test_numeric_score_bounded_over_grid() {
    let weights = ScoringWeights::default();
    let regions = [None, Some("新潟県"), Some("秋田")];
    let prices = [None, Some("1000-2000円"), Some("9000-12000円")];

    for wanted in 1..=5u8 {
        for actual in 1..=5u8 {
            for region in regions {
                for price in prices {
                    let profile = PreferenceProfile {
                        sweetness: Some(wanted),
                        aroma: Some(6 - wanted),
                        region: Some("新潟".to_string()),
                        budget_min: Some(1500),
                        budget_max: Some(3000),
                        free_text: None,
                    };
                    let item = CatalogItem {
                        sweetness: Some(actual),
                        aroma: Some(actual),
                        region: region.map(str::to_string),
                        price_descriptor: price.map(str::to_string),
                        ..create_item(1)
                    };

                    let score = calculate_match_score(&profile, &item, &weights);
                    assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
                }
            }
        }
    }
}

#[test]
fn test_numeric_score_zero_when_nothing_comparable() {
    let profile = PreferenceProfile {
        sweetness: Some(3),
        ..Default::default()
    };

    assert_eq!(calculate_match_score(&profile, &create_item(1), &ScoringWeights::default()), 0.0);
}

#[test]
fn test_custom_weights_change_balance() {
    let profile = PreferenceProfile {
        sweetness: Some(5),
        aroma: Some(5),
        ..Default::default()
    };
    let item = CatalogItem {
        sweetness: Some(5),
        aroma: Some(1),
        ..create_item(1)
    };

    let sweetness_heavy = ScoringWeights { sweetness: 0.9, aroma: 0.1, region: 0.0, budget: 0.0 };
    let aroma_heavy = ScoringWeights { sweetness: 0.1, aroma: 0.9, region: 0.0, budget: 0.0 };

    assert!(
        calculate_match_score(&profile, &item, &sweetness_heavy)
            > calculate_match_score(&profile, &item, &aroma_heavy)
    );
}

#[test]
fn test_cosine_properties() {
    let v = [0.25f32, 0.5, -1.0, 2.0];
    let w = [1.0f32, -0.5, 0.0, 0.75];

    assert_eq!(cosine_similarity(&v, &v), 1.0);
    assert_eq!(cosine_similarity(&v, &[0.0; 4]), 0.0);
    assert_eq!(cosine_similarity(&v, &w), cosine_similarity(&w, &v));
    assert_eq!(normalize_similarity(1.0), 1.0);
    assert_eq!(normalize_similarity(-1.0), 0.0);
}

#[test]
fn test_ranker_output_order_and_formula() {
    let ranker = HybridRanker::new(ScoringWeights::default(), HybridWeights::default());
    let profile = PreferenceProfile {
        aroma: Some(4),
        ..Default::default()
    };
    let user = vec![1.0f32, 0.0, 0.0];

    let items: Vec<CatalogItem> = (0..40)
        .map(|i| CatalogItem {
            aroma: Some((i % 5 + 1) as u8),
            embedding: if i % 3 == 0 { None } else { Some(vec![1.0, (i % 4) as f32, 0.5]) },
            ..create_item(100 - i)
        })
        .collect();

    let ranked = ranker.rank(&profile, Some(user.as_slice()), &items, DEFAULT_CANDIDATE_WINDOW);

    assert_eq!(ranked.len(), DEFAULT_CANDIDATE_WINDOW);
    for c in &ranked {
        assert_eq!(c.hybrid_score, 0.4 * c.numeric_score + 0.6 * c.semantic_score);
    }
    for pair in ranked.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.hybrid_score > b.hybrid_score || (a.hybrid_score == b.hybrid_score && a.item.id < b.item.id),
            "ordering violated between {} and {}",
            a.item.id,
            b.item.id
        );
    }
}

#[test]
fn test_preference_text_equal_for_equal_profiles() {
    let a = PreferenceProfile {
        sweetness: Some(2),
        region: Some("広島県".to_string()),
        ..Default::default()
    };
    let b = a.clone();

    assert_eq!(preference_text(&a), preference_text(&b));
    assert_ne!(preference_text(&a), preference_text(&PreferenceProfile::default()));
}

#[test]
fn test_repair_is_bounded_to_known_fixes() {
    assert_eq!(repair_json(r#"{"a":[1,2,],}"#), r#"{"a":[1,2]}"#);
    assert_eq!(repair_json("{\u{201C}a\u{201D}: 1}"), r#"{"a": 1}"#);
    // Unquoted keys are not something the repair pass fixes
    assert_eq!(repair_json("{a: 1}"), "{a: 1}");
}
