//! Configuration for the policy RAG pipeline

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration
///
/// Every field has a safe default so a missing or partial TOML file still
/// yields a working configuration. Secrets are read from the environment,
/// never from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// LLM and embedding provider configuration
    pub llm: LlmConfig,
    /// Document storage configuration
    pub storage: StorageConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Terminology map from the configured path; empty when unset
    pub fn terminology(&self) -> crate::terminology::TerminologyMap {
        match &self.storage.terminology_path {
            Some(path) => crate::terminology::TerminologyMap::load(path),
            None => crate::terminology::TerminologyMap::empty(),
        }
    }

    /// Jargon term set for the simplicity metric; empty when unset
    pub fn jargon_terms(&self) -> std::collections::HashSet<String> {
        match &self.storage.jargon_path {
            Some(path) => crate::evaluation::simplicity::load_jargon_terms(path),
            None => Default::default(),
        }
    }
}

/// Text chunking configuration
///
/// Values are tuned for insurance documents, which are dense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Upper bound on approximate tokens per chunk
    pub max_tokens: usize,
    /// Approximate tokens shared between adjacent chunks so context survives a cut
    pub overlap_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 800,
            overlap_tokens: 80,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks fetched per sub-query during section retrieval
    pub top_k_per_query: usize,
    /// Cap on merged chunks handed to the generator for one section
    pub max_chunks_per_section: usize,
    /// Chunks fetched for a direct question
    pub qa_top_k: usize,
    /// A best-hit distance below this marks retrieval as strong
    pub strong_distance: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k_per_query: 4,
            max_chunks_per_section: 18,
            qa_top_k: 6,
            strong_distance: 0.35,
        }
    }
}

/// Generation and embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Environment variable holding the API key. The key itself never lives
    /// in a config file.
    pub api_key_env: String,
    /// Generation model name
    pub model: String,
    /// Embedding model name
    pub embed_model: String,
    /// Embedding vector width
    pub embed_dimensions: usize,
    /// Low temperature keeps answers factual
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            embed_dimensions: 1536,
            temperature: 0.1,
            timeout_secs: 60,
        }
    }
}

/// Document storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for per-document artifacts
    pub data_dir: PathBuf,
    /// Optional canonical-term map (JSON: canonical -> synonyms)
    pub terminology_path: Option<PathBuf>,
    /// Optional jargon term list (JSON array) for the simplicity metric
    pub jargon_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("policy-rag")
            .join("documents");

        Self {
            data_dir,
            terminology_path: None,
            jargon_path: None,
        }
    }
}
