use serde::{Deserialize, Serialize};
use crate::models::domain::RecommendationResult;

/// Response for the recommend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub recommendations: Vec<RecommendationResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "semanticDegraded")]
    pub semantic_degraded: bool,
    #[serde(rename = "fallbackUsed")]
    pub fallback_used: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}
