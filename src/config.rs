use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::{PipelineOptions, DEFAULT_CANDIDATE_WINDOW, MIN_RESULTS};
use crate::models::{ScoringWeights, HybridWeights};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub openai: OpenAiSettings,
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub api_key: String,
    #[serde(default = "default_embedding_path")]
    pub embedding_path: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_api_base() -> String { "https://api.openai.com/v1".to_string() }
fn default_embedding_path() -> String { "/embeddings".to_string() }
fn default_embedding_model() -> String { "text-embedding-3-small".to_string() }
fn default_chat_path() -> String { "/chat/completions".to_string() }
fn default_chat_model() -> String { "gpt-4o-mini".to_string() }
fn default_temperature() -> f32 { 0.7 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
    #[serde(default = "default_candidate_window")]
    pub candidate_window: usize,
    #[serde(default = "default_min_results")]
    pub min_results: usize,
    #[serde(default = "default_embedding_timeout_ms")]
    pub embedding_timeout_ms: u64,
    #[serde(default = "default_generative_timeout_ms")]
    pub generative_timeout_ms: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
            candidate_window: default_candidate_window(),
            min_results: default_min_results(),
            embedding_timeout_ms: default_embedding_timeout_ms(),
            generative_timeout_ms: default_generative_timeout_ms(),
        }
    }
}

impl RecommendationSettings {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            embedding_timeout: Duration::from_millis(self.embedding_timeout_ms),
            generative_timeout: Duration::from_millis(self.generative_timeout_ms),
            min_results: self.min_results,
        }
    }
}

fn default_max_results() -> usize { 5 }
fn default_candidate_window() -> usize { DEFAULT_CANDIDATE_WINDOW }
fn default_min_results() -> usize { MIN_RESULTS }
fn default_embedding_timeout_ms() -> u64 { 10_000 }
fn default_generative_timeout_ms() -> u64 { 30_000 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub hybrid: HybridConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_sweetness_weight")]
    pub sweetness: f64,
    #[serde(default = "default_aroma_weight")]
    pub aroma: f64,
    #[serde(default = "default_region_weight")]
    pub region: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            sweetness: default_sweetness_weight(),
            aroma: default_aroma_weight(),
            region: default_region_weight(),
            budget: default_budget_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(cfg: &WeightsConfig) -> Self {
        Self {
            sweetness: cfg.sweetness,
            aroma: cfg.aroma,
            region: cfg.region,
            budget: cfg.budget,
        }
    }
}

fn default_sweetness_weight() -> f64 { 0.4 }
fn default_aroma_weight() -> f64 { 0.3 }
fn default_region_weight() -> f64 { 0.2 }
fn default_budget_weight() -> f64 { 0.1 }

#[derive(Debug, Clone, Deserialize)]
pub struct HybridConfig {
    #[serde(default = "default_numeric_weight")]
    pub numeric: f64,
    #[serde(default = "default_semantic_weight")]
    pub semantic: f64,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            numeric: default_numeric_weight(),
            semantic: default_semantic_weight(),
        }
    }
}

impl From<&HybridConfig> for HybridWeights {
    fn from(cfg: &HybridConfig) -> Self {
        Self {
            numeric: cfg.numeric,
            semantic: cfg.semantic,
        }
    }
}

fn default_numeric_weight() -> f64 { 0.4 }
fn default_semantic_weight() -> f64 { 0.6 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SAKE__)
    /// 5. OPENAI_API_KEY / OPENAI_API_BASE
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SAKE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SAKE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_provider_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SAKE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_provider_env(settings)?.try_deserialize()
    }
}

/// Apply the conventional provider variables on top of loaded settings
fn apply_provider_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(api_key) = env::var("OPENAI_API_KEY") {
        builder = builder.set_override("openai.api_key", api_key)?;
    }
    if let Ok(api_base) = env::var("OPENAI_API_BASE") {
        builder = builder.set_override("openai.api_base", api_base)?;
    }

    builder.build()
}
