use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{RecommendRequest, RecommendResponse, HealthResponse, ErrorResponse};
use crate::services::CatalogStore;
use crate::core::{Recommender, RecommendError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub recommender: Arc<Recommender>,
    pub default_max_results: usize,
    pub candidate_window: usize,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::post().to(recommend));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommendation endpoint
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "preferredSweetness": 3,
///   "preferredAroma": 4,
///   "preferredRegion": "新潟県",
///   "budgetMin": 1000,
///   "budgetMax": 5000,
///   "additionalPreferences": "string",
///   "maxResults": 5,
///   "candidateWindow": 20
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let user_id = &req.user_id;
    let max_results = req.max_results.unwrap_or(state.default_max_results);
    let candidate_window = req.candidate_window.unwrap_or(state.candidate_window);
    let profile = req.profile();

    tracing::info!(
        "Recommending for user: {}, max_results: {}, window: {}",
        user_id,
        max_results,
        candidate_window
    );

    let run = match state
        .recommender
        .recommend_from_store(state.catalog.as_ref(), &profile, max_results, candidate_window)
        .await
    {
        Ok(run) => run,
        Err(RecommendError::InvalidRequest(message)) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid request".to_string(),
                message,
                status_code: 400,
            });
        }
        Err(e) => {
            tracing::error!("Failed to recommend for {}: {}", user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to read catalog".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let response = RecommendResponse {
        user_id: user_id.clone(),
        request_id: uuid::Uuid::new_v4().to_string(),
        total_candidates: run.total_candidates,
        semantic_degraded: run.semantic_degraded(),
        fallback_used: run.fallback_used(),
        recommendations: run.results,
    };

    tracing::info!(
        "Returning {} recommendations for user {} (from {} candidates)",
        response.recommendations.len(),
        user_id,
        response.total_candidates
    );

    HttpResponse::Ok().json(response)
}
