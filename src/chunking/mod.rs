//! Text chunking: fixed character windows with overlap, snapped back to a
//! sentence or line break when one falls past the middle of the window.

pub mod window;

use serde_json::{Map, Value};
use thiserror::Error;

use window::split_windows;

/// Invalid chunk window configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    OverlapTooLarge { chunk_size: usize, overlap: usize },
}

/// A validated chunk window. Constructing one is the only way to reach the
/// splitter, so an overlap that would stall the cursor never gets that far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSettings {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkSettings {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if chunk_size == 0 {
            return Err(ChunkError::ZeroChunkSize);
        }
        if overlap >= chunk_size {
            return Err(ChunkError::OverlapTooLarge {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Split `text` into trimmed windows. Always returns at least one element.
    pub fn split(&self, text: &str) -> Vec<String> {
        split_windows(text, self.chunk_size, self.overlap)
    }
}

/// One window of a source document, before it is embedded and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub index: usize,
    pub total_chunks: usize,
    pub source_metadata: Map<String, Value>,
}

impl Chunk {
    /// Caller metadata extended with the chunk's position and the length (in
    /// characters) of the document it came from. Position keys win over any
    /// caller-supplied keys of the same name.
    pub fn record_metadata(&self, original_doc_length: usize) -> Map<String, Value> {
        let mut metadata = self.source_metadata.clone();
        metadata.insert("chunk_index".into(), Value::from(self.index));
        metadata.insert("total_chunks".into(), Value::from(self.total_chunks));
        metadata.insert("original_doc_length".into(), Value::from(original_doc_length));
        metadata
    }
}

/// Chunk a whole document, numbering the pieces in production order.
pub fn chunk_document(
    text: &str,
    metadata: &Map<String, Value>,
    settings: &ChunkSettings,
) -> Vec<Chunk> {
    let pieces = settings.split(text);
    let total_chunks = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            text,
            index,
            total_chunks,
            source_metadata: metadata.clone(),
        })
        .collect()
}
