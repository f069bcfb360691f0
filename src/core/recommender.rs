use crate::models::{PreferenceProfile, CatalogItem, RecommendationResult, ScoringWeights, HybridWeights};
use crate::core::{
    assembler::assemble_results,
    embedding::PreferenceEmbedder,
    fallback::{complete_with_fallback, MIN_RESULTS},
    ranker::HybridRanker,
    rerank::{GenerativeReranker, RerankFailure},
};
use crate::services::{CatalogStore, CatalogError, EmbeddingService, EmbeddingError, GenerativeService};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a recommendation run
///
/// Embedding and generative failures are never surfaced here; they degrade
/// the run instead.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Timeouts and result-count floor for a pipeline run
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub embedding_timeout: Duration,
    pub generative_timeout: Duration,
    pub min_results: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            embedding_timeout: Duration::from_secs(10),
            generative_timeout: Duration::from_secs(30),
            min_results: MIN_RESULTS,
        }
    }
}

/// Result of one pipeline run with the reasons for any degradation
#[derive(Debug)]
pub struct RecommendationRun {
    pub results: Vec<RecommendationResult>,
    pub total_candidates: usize,
    pub window_size: usize,
    pub embedding_error: Option<EmbeddingError>,
    pub rerank_error: Option<RerankFailure>,
    pub auto_filled: usize,
}

impl RecommendationRun {
    fn empty(total_candidates: usize) -> Self {
        Self {
            results: Vec::new(),
            total_candidates,
            window_size: 0,
            embedding_error: None,
            rerank_error: None,
            auto_filled: 0,
        }
    }

    pub fn semantic_degraded(&self) -> bool {
        self.embedding_error.is_some()
    }

    pub fn fallback_used(&self) -> bool {
        self.auto_filled > 0
    }
}

/// Main recommendation orchestrator
///
/// # Pipeline Stages
/// 1. Preference embedding (degrades to numeric-only on failure)
/// 2. Numeric + semantic scoring and hybrid ranking into a candidate window
/// 3. Generative reranking of the window
/// 4. Fallback completion from the hybrid ranking
/// 5. Result assembly with score provenance
#[derive(Clone)]
pub struct Recommender {
    ranker: HybridRanker,
    embedder: PreferenceEmbedder,
    reranker: GenerativeReranker,
    min_results: usize,
}

impl Recommender {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        generative: Arc<dyn GenerativeService>,
        weights: ScoringWeights,
        hybrid: HybridWeights,
        options: PipelineOptions,
    ) -> Self {
        Self {
            ranker: HybridRanker::new(weights, hybrid),
            embedder: PreferenceEmbedder::new(embedding, options.embedding_timeout),
            reranker: GenerativeReranker::new(generative, options.generative_timeout),
            min_results: options.min_results,
        }
    }

    pub fn with_default_weights(
        embedding: Arc<dyn EmbeddingService>,
        generative: Arc<dyn GenerativeService>,
    ) -> Self {
        Self::new(
            embedding,
            generative,
            ScoringWeights::default(),
            HybridWeights::default(),
            PipelineOptions::default(),
        )
    }

    pub fn ranker(&self) -> &HybridRanker {
        &self.ranker
    }

    /// Recommend up to `max_results` items from `items`
    ///
    /// # Arguments
    /// * `profile` - The user's taste profile
    /// * `items` - Catalog snapshot to rank
    /// * `max_results` - Maximum number of recommendations to return
    /// * `candidate_window` - Number of top hybrid candidates sent to the reranker
    pub async fn recommend(
        &self,
        profile: &PreferenceProfile,
        items: &[CatalogItem],
        max_results: usize,
        candidate_window: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        Ok(self.run(profile, items, max_results, candidate_window).await?.results)
    }

    /// Read the catalog from `store`, then recommend
    pub async fn recommend_from_store(
        &self,
        store: &dyn CatalogStore,
        profile: &PreferenceProfile,
        max_results: usize,
        candidate_window: usize,
    ) -> Result<RecommendationRun, RecommendError> {
        let items = store.list_items().await?;
        self.run(profile, &items, max_results, candidate_window).await
    }

    /// Run the full pipeline and report how it degraded, if at all
    pub async fn run(
        &self,
        profile: &PreferenceProfile,
        items: &[CatalogItem],
        max_results: usize,
        candidate_window: usize,
    ) -> Result<RecommendationRun, RecommendError> {
        let total_candidates = items.len();

        // No collaborator is called when there is nothing to return
        if items.is_empty() || max_results == 0 {
            return Ok(RecommendationRun::empty(total_candidates));
        }

        if candidate_window == 0 {
            return Err(RecommendError::InvalidRequest(
                "candidate window must be at least 1".to_string(),
            ));
        }

        // Stage 1: user embedding
        let (user_embedding, embedding_error) = match self.embedder.try_embed(profile).await {
            Ok(vector) => (Some(vector), None),
            Err(e) => {
                tracing::warn!("Preference embedding unavailable, ranking on attributes only: {}", e);
                (None, Some(e))
            }
        };

        // Stage 2: hybrid ranking
        let window = self
            .ranker
            .rank(profile, user_embedding.as_deref(), items, candidate_window);

        tracing::debug!("Hybrid ranking kept {} of {} items", window.len(), total_candidates);

        // Stage 3: generative rerank
        let (mut recommendations, rerank_error) = match self.reranker.rerank(profile, &window).await {
            Ok(recs) => (recs, None),
            Err(e) => {
                tracing::warn!("Generative rerank failed, using ranking scores: {}", e);
                (Vec::new(), Some(e))
            }
        };

        // Stage 4: fallback completion
        let auto_filled = complete_with_fallback(&mut recommendations, &window, self.min_results);

        // Stage 5: assembly
        let results = assemble_results(recommendations, &window, max_results);

        tracing::info!(
            "Recommended {} items (from {} candidates, window {}, auto-filled {})",
            results.len(),
            total_candidates,
            window.len(),
            auto_filled
        );

        Ok(RecommendationRun {
            results,
            total_candidates,
            window_size: window.len(),
            embedding_error,
            rerank_error,
            auto_filled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fallback::AUTO_FILL_REASON;
    use crate::services::GenerativeError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEmbedding {
        vector: Option<Vec<f32>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingService for FixedEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.vector
                .clone()
                .ok_or_else(|| EmbeddingError::ApiError("down".to_string()))
        }
    }

    struct FixedCompletion {
        text: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerativeService for FixedCompletion {
        async fn complete(&self, _prompt: &str, json_mode: bool) -> Result<String, GenerativeError> {
            assert!(json_mode);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.text
                .clone()
                .ok_or_else(|| GenerativeError::ApiError("quota exceeded".to_string()))
        }
    }

    fn create_item(id: i64, sweetness: u8) -> CatalogItem {
        CatalogItem {
            id,
            name: format!("Sake {}", id),
            category: "純米".to_string(),
            region: Some("新潟県".to_string()),
            sweetness: Some(sweetness),
            aroma: None,
            price_descriptor: None,
            description: None,
            embedding: Some(vec![1.0, 0.0]),
        }
    }

    fn create_recommender(
        vector: Option<Vec<f32>>,
        text: Option<&str>,
    ) -> (Recommender, Arc<FixedEmbedding>, Arc<FixedCompletion>) {
        let embedding = Arc::new(FixedEmbedding {
            vector,
            calls: AtomicUsize::new(0),
        });
        let generative = Arc::new(FixedCompletion {
            text: text.map(str::to_string),
            calls: AtomicUsize::new(0),
        });

        let recommender = Recommender::with_default_weights(embedding.clone(), generative.clone());
        (recommender, embedding, generative)
    }

    #[tokio::test]
    async fn test_empty_catalog_calls_nothing() {
        let (recommender, embedding, generative) = create_recommender(Some(vec![1.0]), Some("{}"));

        let results = recommender
            .recommend(&PreferenceProfile::default(), &[], 5, 20)
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(embedding.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generative.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_catalog_with_zero_window() {
        let (recommender, embedding, generative) = create_recommender(Some(vec![1.0]), Some("{}"));

        let results = recommender
            .recommend(&PreferenceProfile::default(), &[], 5, 0)
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(embedding.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generative.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_window_is_rejected() {
        let (recommender, _, _) = create_recommender(None, None);

        let result = recommender
            .recommend(&PreferenceProfile::default(), &[create_item(1, 3)], 5, 0)
            .await;

        assert!(matches!(result, Err(RecommendError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_both_collaborators_down() {
        let (recommender, _, _) = create_recommender(None, None);
        let items: Vec<CatalogItem> = (1..=5).map(|i| create_item(i, i as u8)).collect();
        let profile = PreferenceProfile {
            sweetness: Some(5),
            ..Default::default()
        };

        let run = recommender.run(&profile, &items, 5, 20).await.unwrap();

        assert!(run.semantic_degraded());
        assert!(matches!(run.rerank_error, Some(RerankFailure::Unavailable(_))));
        assert_eq!(run.auto_filled, 3);
        let ids: Vec<i64> = run.results.iter().map(|r| r.item_id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
        assert!(run.results.iter().all(|r| r.reason == AUTO_FILL_REASON && r.semantic_score == 0.0));
    }

    #[tokio::test]
    async fn test_generative_output_is_used() {
        let (recommender, _, _) = create_recommender(
            Some(vec![1.0, 0.0]),
            Some(r#"{"recommendations":[
                {"itemId":2,"itemName":"Sake 2","reason":"甘口","score":0.9,"matchPoints":["甘さ"]},
                {"itemId":1,"itemName":"Sake 1","reason":"定番","score":0.8,"matchPoints":[]},
                {"itemId":3,"itemName":"Sake 3","reason":"香り","score":0.7,"matchPoints":[]}
            ]}"#),
        );
        let items: Vec<CatalogItem> = (1..=4).map(|i| create_item(i, 3)).collect();

        let run = recommender
            .run(&PreferenceProfile::default(), &items, 5, 20)
            .await
            .unwrap();

        assert!(run.embedding_error.is_none());
        assert!(run.rerank_error.is_none());
        assert!(!run.fallback_used());
        let ids: Vec<i64> = run.results.iter().map(|r| r.item_id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(run.results[0].match_points, vec!["甘さ".to_string()]);
    }
}
