use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chunk as persisted by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A stored chunk returned for a query, ranked by distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedResult {
    pub id: String,
    pub text: String,
    pub metadata: Map<String, Value>,
    pub distance: f32,
    /// `1 - distance`; higher is more similar
    pub score: f32,
}

impl RetrievedResult {
    pub fn new(id: String, text: String, metadata: Map<String, Value>, distance: f32) -> Self {
        Self {
            id,
            text,
            metadata,
            distance,
            score: 1.0 - distance,
        }
    }
}

/// Answer to a query together with the chunks it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Vec<SourceDocument>,
    pub query: String,
}

/// A retrieved chunk as presented to API callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub content: String,
    pub metadata: Map<String, Value>,
    pub score: f32,
}

impl From<RetrievedResult> for SourceDocument {
    fn from(result: RetrievedResult) -> Self {
        Self {
            id: result.id,
            content: result.text,
            metadata: result.metadata,
            score: result.score,
        }
    }
}

/// Document ingestion request
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUpload {
    pub content: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Query request
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Falls back to the configured default when absent
    pub top_k: Option<usize>,
}

/// Generic `{status, message}` body used for liveness, clears and errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn new(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new("success", message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("error", message)
    }
}

/// Single-document ingestion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDocumentResponse {
    pub status: String,
    pub message: String,
    pub document_ids: Vec<String>,
    pub chunks_created: usize,
}

/// Batch ingestion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAddResponse {
    pub status: String,
    pub message: String,
    pub document_ids: Vec<String>,
    pub total_chunks_created: usize,
}

/// Collection statistics reported by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    pub total_documents: usize,
    pub collection_name: String,
    pub path: String,
}

/// Health of the answer generator as reported by `/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeneratorHealth {
    Healthy {
        model: String,
        test_response_length: usize,
    },
    Unhealthy {
        error: String,
    },
    Degraded {
        model: String,
        message: String,
    },
}

/// `/stats` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    pub status: String,
    pub vector_store: CollectionStats,
    pub llm_service: GeneratorHealth,
}
