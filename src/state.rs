use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::llm::embeddings::{Embedder, HttpEmbedder};
use crate::llm::generate::resolve_generator;
use crate::rag::RagService;
use crate::search::vector::LocalVectorStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rag: Arc<RagService>,
}

impl AppState {
    /// Construct every collaborator once. An invalid chunk window or an
    /// unopenable vector index aborts startup; an unreachable answer generator
    /// only degrades it.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let chunking = config
            .chunk_settings()
            .context("Invalid chunking configuration")?;

        let index = LocalVectorStore::open_or_create(&config.storage_path, &config.collection_name)
            .context("Failed to open vector index")?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let embedder = HttpEmbedder::new(http_client.clone(), config.llm.clone())?;
        tracing::info!("Embedding model: {}", embedder.model_name());

        let generator = resolve_generator(&http_client, &config.llm).await;
        if generator.is_available() {
            tracing::info!("Answers generated by {}", generator.model_name());
        } else {
            tracing::info!(
                "Answers use extractive fallback ({} not reachable or disabled)",
                generator.model_name()
            );
        }

        let rag = RagService::new(chunking, Arc::new(embedder), Arc::new(index), generator);
        Ok(Self::from_parts(config, rag))
    }

    /// Assemble state from an already-built service.
    pub fn from_parts(config: Config, rag: RagService) -> Self {
        Self {
            config: Arc::new(config),
            rag: Arc::new(rag),
        }
    }
}
