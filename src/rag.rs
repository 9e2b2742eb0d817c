//! Ingestion and query orchestration.
//!
//! ```text
//!  ingest:  text ──chunk──▶ [chunk] ──embed──▶ [vector] ──add──▶ index
//!  answer:  query ──embed──▶ vector ──top_k──▶ [hit] ──generate──▶ answer
//! ```

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::chunking::{chunk_document, ChunkSettings};
use crate::llm::answer::AnswerGenerator;
use crate::llm::embeddings::Embedder;
use crate::models::{DocumentUpload, QueryAnswer, StoredRecord, SystemStats};
use crate::search::vector::VectorIndex;

/// Composes the chunker, embedder, vector index and answer generator. All
/// collaborators are built at startup and injected here.
pub struct RagService {
    chunking: ChunkSettings,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generator: AnswerGenerator,
}

impl RagService {
    pub fn new(
        chunking: ChunkSettings,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator: AnswerGenerator,
    ) -> Self {
        Self {
            chunking,
            embedder,
            index,
            generator,
        }
    }

    /// Chunk, embed and store one document, returning the new record ids in
    /// chunk order. The chunks are written to the index in one batch. If
    /// embedding fails part way, the chunks embedded before the failure are
    /// still stored and the error is returned.
    pub async fn ingest(&self, text: &str, metadata: &Map<String, Value>) -> Result<Vec<String>> {
        let original_doc_length = text.chars().count();
        let chunks = chunk_document(text, metadata, &self.chunking);
        let mut records = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            let vector = match self.embedder.embed_one(&chunk.text).await {
                Ok(vector) => vector,
                Err(e) => {
                    let stored = records.len();
                    self.store(records)?;
                    return Err(e).with_context(|| {
                        format!("Failed to embed chunk {} ({stored} earlier chunks stored)", chunk.index)
                    });
                }
            };

            records.push(StoredRecord {
                id: Uuid::new_v4().to_string(),
                vector,
                text: chunk.text.clone(),
                metadata: chunk.record_metadata(original_doc_length),
            });
        }

        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        self.store(records)?;

        tracing::info!(
            "Added document with {} chunks ({} chars)",
            ids.len(),
            original_doc_length
        );
        Ok(ids)
    }

    fn store(&self, records: Vec<StoredRecord>) -> Result<()> {
        let count = records.len();
        self.index
            .add_batch(records)
            .with_context(|| format!("Failed to store {count} chunks"))
    }

    /// Ingest each document in turn, concatenating their ids.
    pub async fn ingest_batch(&self, documents: &[DocumentUpload]) -> Result<Vec<String>> {
        let empty = Map::new();
        let mut ids = Vec::new();
        for (i, doc) in documents.iter().enumerate() {
            let metadata = doc.metadata.as_ref().unwrap_or(&empty);
            let doc_ids = self
                .ingest(&doc.content, metadata)
                .await
                .with_context(|| format!("Document {i} of batch"))?;
            ids.extend(doc_ids);
        }
        tracing::info!(
            "Added {} chunks from {} documents",
            ids.len(),
            documents.len()
        );
        Ok(ids)
    }

    /// Retrieve the `top_k` nearest chunks and answer from them. Failures are
    /// folded into the returned answer with no sources.
    pub async fn answer(&self, query: &str, top_k: usize) -> QueryAnswer {
        match self.try_answer(query, top_k).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Failed to process query: {e:#}");
                QueryAnswer {
                    answer: format!(
                        "Sorry, I encountered an error while processing your query: {e:#}"
                    ),
                    sources: Vec::new(),
                    query: query.to_string(),
                }
            }
        }
    }

    async fn try_answer(&self, query: &str, top_k: usize) -> Result<QueryAnswer> {
        let query_vector = self
            .embedder
            .embed_one(query)
            .await
            .context("Failed to embed query")?;
        let results = self
            .index
            .query(&query_vector, top_k)
            .context("Failed to search documents")?;
        tracing::info!("Found {} similar documents for query", results.len());

        let answer = self.generator.answer(query, &results).await;

        Ok(QueryAnswer {
            answer,
            sources: results.into_iter().map(Into::into).collect(),
            query: query.to_string(),
        })
    }

    pub async fn stats(&self) -> Result<SystemStats> {
        let vector_store = self.index.stats().context("Failed to get collection stats")?;
        let llm_service = self.generator.health().await;
        Ok(SystemStats {
            status: "operational".to_string(),
            vector_store,
            llm_service,
        })
    }

    /// Irreversibly drop every stored chunk.
    pub fn clear(&self) -> Result<()> {
        self.index.reset().context("Failed to clear collection")?;
        tracing::info!("Collection '{}' cleared", self.index.collection_name());
        Ok(())
    }
}
