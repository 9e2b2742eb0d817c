use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::chunking::{ChunkError, ChunkSettings};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Directory holding the persisted vector collections
    pub storage_path: PathBuf,
    /// Name of the collection documents are stored in
    pub collection_name: String,
    /// Chunk window in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// `top_k` used when a query does not name one
    pub default_top_k: usize,
    /// LLM provider configuration
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for answer generation
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Sampling temperature for answer generation
    pub temperature: f32,
    /// When false the generator is never contacted and fallback answers are used
    pub generation_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: format!("{DEFAULT_HOST}:{DEFAULT_PORT}"),
            storage_path: PathBuf::from("./chroma_db"),
            collection_name: "documents".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            default_top_k: 5,
            llm: LlmConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama2".to_string(),
            embedding_model: "all-minilm".to_string(),
            api_key: None,
            temperature: 0.7,
            generation_enabled: true,
        }
    }
}

impl Config {
    /// Build the configuration from the process environment, after loading a
    /// `.env` file from the working directory if one exists.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from `lookup`. Each setting takes the first
    /// variable that is set, so the `RAG_*`/`LLM_*` names win over the
    /// legacy ones listed after them.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Env(&lookup);
        let mut config = Self::default();

        if let Some(addr) = env.first(&["RAG_BIND_ADDR"]) {
            config.bind_addr = addr;
        } else {
            let host = env.first(&["API_HOST"]);
            let port: Option<u16> = env.parse(&["API_PORT"]);
            if host.is_some() || port.is_some() {
                config.bind_addr = format!(
                    "{}:{}",
                    host.as_deref().unwrap_or(DEFAULT_HOST),
                    port.unwrap_or(DEFAULT_PORT)
                );
            }
        }
        if let Some(path) = env.first(&["RAG_STORAGE_PATH", "CHROMA_PERSIST_DIRECTORY"]) {
            config.storage_path = PathBuf::from(path);
        }
        if let Some(name) = env.first(&["RAG_COLLECTION_NAME"]) {
            config.collection_name = name;
        }
        if let Some(v) = env.parse(&["RAG_CHUNK_SIZE"]) {
            config.chunk_size = v;
        }
        if let Some(v) = env.parse(&["RAG_CHUNK_OVERLAP"]) {
            config.chunk_overlap = v;
        }
        if let Some(v) = env.parse(&["RAG_TOP_K"]) {
            config.default_top_k = v;
        }

        if let Some(provider) = env.first(&["LLM_PROVIDER"]) {
            config.llm.provider = provider;
        }
        if let Some(url) = env.first(&["LLM_BASE_URL", "OLLAMA_HOST"]) {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = env.first(&["LLM_CHAT_MODEL", "LLM_MODEL"]) {
            config.llm.chat_model = model;
        }
        if let Some(model) = env.first(&["LLM_EMBEDDING_MODEL", "EMBEDDING_MODEL"]) {
            config.llm.embedding_model = model;
        }
        if let Some(key) = env.first(&["LLM_API_KEY", "OPENAI_API_KEY"]) {
            config.llm.api_key = Some(key);
        }
        if let Some(v) = env.parse(&["LLM_TEMPERATURE"]) {
            config.llm.temperature = v;
        }
        if let Some(v) = env.parse(&["LLM_GENERATION_ENABLED"]) {
            config.llm.generation_enabled = v;
        }

        config
    }

    /// Validated chunk window. Startup aborts on an invalid window rather than
    /// letting ingestion spin on a cursor that never advances.
    pub fn chunk_settings(&self) -> Result<ChunkSettings, ChunkError> {
        ChunkSettings::new(self.chunk_size, self.chunk_overlap)
    }

    /// File backing the configured collection.
    pub fn collection_path(&self) -> PathBuf {
        self.storage_path.join(format!("{}.json", self.collection_name))
    }
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Value of the first set, non-empty variable in `names`.
    fn first(&self, names: &[&str]) -> Option<String> {
        names
            .iter()
            .copied()
            .find_map(|name| (self.0)(name).filter(|v| !v.trim().is_empty()))
    }

    fn parse<T: FromStr>(&self, names: &[&str]) -> Option<T> {
        names.iter().copied().find_map(|name| {
            let raw = (self.0)(name)?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring unparseable {name}={raw:?}, keeping default");
                    None
                }
            }
        })
    }
}
