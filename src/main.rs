use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use sake_recommender::config::Settings;
use sake_recommender::core::Recommender;
use sake_recommender::models::{ScoringWeights, HybridWeights};
use sake_recommender::routes::{self, recommendations::AppState};
use sake_recommender::services::{JsonFileCatalog, OpenAiChatClient, OpenAiEmbeddingClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting sake recommendation service...");

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        io_error(e)
    })?;

    info!("Configuration loaded successfully");

    // Initialize provider clients
    let openai = &settings.openai;
    let recommendation = &settings.recommendation;

    let embedding = OpenAiEmbeddingClient::new(
        openai.api_base.clone(),
        openai.embedding_path.clone(),
        openai.api_key.clone(),
        openai.embedding_model.clone(),
        Duration::from_millis(recommendation.embedding_timeout_ms),
    )
    .map_err(io_error)?;

    let generative = OpenAiChatClient::new(
        openai.api_base.clone(),
        openai.chat_path.clone(),
        openai.api_key.clone(),
        openai.chat_model.clone(),
        openai.temperature,
        Duration::from_millis(recommendation.generative_timeout_ms),
    )
    .map_err(io_error)?;

    info!(
        "Provider clients initialized (embedding: {}, chat: {})",
        openai.embedding_model, openai.chat_model
    );

    // Initialize recommender with configured weights
    let weights = ScoringWeights::from(&settings.scoring.weights);
    let hybrid = HybridWeights::from(&settings.scoring.hybrid);

    let recommender = Recommender::new(
        Arc::new(embedding),
        Arc::new(generative),
        weights,
        hybrid,
        recommendation.pipeline_options(),
    );

    info!("Recommender initialized with weights: {:?}, hybrid: {:?}", weights, hybrid);

    // Build application state
    let app_state = AppState {
        catalog: Arc::new(JsonFileCatalog::new(&settings.catalog.path)),
        recommender: Arc::new(recommender),
        default_max_results: recommendation.default_max_results,
        candidate_window: recommendation.candidate_window,
    };

    info!("Catalog store reading from {}", settings.catalog.path);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
