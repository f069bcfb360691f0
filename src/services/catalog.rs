use crate::models::CatalogItem;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Read-only source of catalog items
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_items(&self) -> Result<Vec<CatalogItem>, CatalogError>;
}

/// Catalog backed by a JSON array on disk, re-read on every call
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogStore for JsonFileCatalog {
    async fn list_items(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let items: Vec<CatalogItem> = serde_json::from_slice(&bytes)?;

        tracing::debug!("Loaded {} catalog items from {}", items.len(), self.path.display());

        Ok(items)
    }
}
