//! Shared fixtures: a deterministic embedder and a temp-dir backed service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use rag_server::chunking::ChunkSettings;
use rag_server::llm::answer::AnswerGenerator;
use rag_server::llm::embeddings::Embedder;
use rag_server::models::{RetrievedResult, StoredRecord};
use rag_server::rag::RagService;
use rag_server::search::vector::{LocalVectorStore, VectorIndex};

/// Returns a fixed vector for known texts and a letter-frequency vector
/// for everything else.
#[derive(Default)]
pub struct FixedEmbedder {
    known: HashMap<String, Vec<f32>>,
}

impl FixedEmbedder {
    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.known.insert(text.to_string(), vector);
        self
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    fn model_name(&self) -> &str {
        "fixed"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                self.known
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| letter_frequencies(t))
            })
            .collect())
    }
}

fn letter_frequencies(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 2];
    for c in text.chars() {
        match c.to_ascii_lowercase() {
            'a'..='m' => v[0] += 1.0,
            'n'..='z' => v[1] += 1.0,
            _ => {}
        }
    }
    v
}

/// Embedder whose backing service is down.
pub struct UnreachableEmbedder;

#[async_trait]
impl Embedder for UnreachableEmbedder {
    fn model_name(&self) -> &str {
        "unreachable"
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        anyhow::bail!("connection refused")
    }
}

/// Index whose storage has gone away: every call fails.
pub struct BrokenIndex {
    path: PathBuf,
}

impl Default for BrokenIndex {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/nonexistent"),
        }
    }
}

impl VectorIndex for BrokenIndex {
    fn add_batch(&self, _records: Vec<StoredRecord>) -> Result<()> {
        anyhow::bail!("disk full")
    }

    fn query(&self, _embedding: &[f32], _top_k: usize) -> Result<Vec<RetrievedResult>> {
        anyhow::bail!("index offline")
    }

    fn count(&self) -> Result<usize> {
        anyhow::bail!("index offline")
    }

    fn reset(&self) -> Result<()> {
        anyhow::bail!("permission denied")
    }

    fn collection_name(&self) -> &str {
        "documents"
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

pub fn service_with(embedder: impl Embedder + 'static, index: impl VectorIndex + 'static) -> RagService {
    RagService::new(
        ChunkSettings::new(1000, 200).unwrap(),
        Arc::new(embedder),
        Arc::new(index),
        AnswerGenerator::unavailable("llama2"),
    )
}

pub fn service(dir: &Path, embedder: FixedEmbedder) -> RagService {
    service_with(embedder, LocalVectorStore::open_or_create(dir, "documents").unwrap())
}
