//! # rag-server
//!
//! An HTTP service for document ingestion and retrieval-augmented question
//! answering. Documents are split into overlapping windows, embedded, and kept
//! in a persisted vector collection; queries retrieve the nearest chunks and
//! hand them to a language model, or answer extractively when no model is
//! reachable.
//!
//! ## Architecture
//!
//! ```text
//!        POST /documents                         POST /query
//!              │                                      │
//!              ▼                                      ▼
//!     ┌─────────────────┐                    ┌─────────────────┐
//!     │     Chunker     │                    │  Embed query    │
//!     │ window+overlap, │                    └────────┬────────┘
//!     │ snap to . or \n │                             │
//!     └────────┬────────┘                             ▼
//!              │ chunks                      ┌─────────────────┐
//!              ▼                             │  Vector index   │
//!     ┌─────────────────┐                    │  top_k by       │
//!     │  Embed chunks   │                    │  cosine distance│
//!     └────────┬────────┘                    └────────┬────────┘
//!              │ (id, vector, text, meta)             │ hits (score = 1 - distance)
//!              ▼                                      ▼
//!     ┌─────────────────┐                    ┌─────────────────┐
//!     │  Vector index   │                    │ Answer generator│
//!     │  (persisted)    │                    │ LLM or fallback │
//!     └─────────────────┘                    └─────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, storage, chunking and LLM settings
//! - [`models`] - Shared data types: stored records, retrieval results, request/response types
//! - [`chunking`] - Overlapping window splitter with sentence/line snapping
//! - [`llm::embeddings`] - Embedding generation via Ollama or OpenAI-compatible APIs
//! - [`llm::generate`] - Prompt completion and the startup availability probe
//! - [`llm::answer`] - Context/prompt building and the extractive fallback
//! - [`search::vector`] - Persisted vector collection with cosine-distance search
//! - [`rag`] - Ingestion and query orchestration
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Startup wiring of all collaborators

pub mod api;
pub mod chunking;
pub mod config;
pub mod llm;
pub mod models;
pub mod rag;
pub mod search;
pub mod state;
