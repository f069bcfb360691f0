// Service exports
pub mod catalog;
pub mod embedding;
pub mod generative;

pub use catalog::{CatalogError, CatalogStore, JsonFileCatalog};
pub use embedding::{EmbeddingError, EmbeddingService, OpenAiEmbeddingClient};
pub use generative::{GenerativeError, GenerativeService, OpenAiChatClient};
