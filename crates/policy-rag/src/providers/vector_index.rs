//! Vector index provider trait: the retrieval collaborator

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Chunk;

/// One nearest-neighbor hit from the index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub chunk_id: String,
    pub page_number: u32,
    pub chunk_text: String,
    /// Distance in the index's metric; smaller is closer. None when the
    /// backend does not report one.
    pub distance: Option<f32>,
}

/// Trait for vector storage and similarity search over document chunks
///
/// The index holds a single active document per process. `replace` makes the
/// wipe-then-rebuild explicit: indexing a new document discards the previous
/// one in the same call. A query racing a replace for a different document
/// can legitimately see the wrong document's chunks; callers serialize
/// ingestion against querying.
#[async_trait]
pub trait VectorIndexProvider: Send + Sync {
    /// Replace the indexed content with this document's chunks
    async fn replace(&self, doc_id: &str, chunks: &[Chunk]) -> Result<()>;

    /// Top-k nearest chunks for the query text, scoped to `doc_id`
    async fn query(&self, doc_id: &str, text: &str, top_k: usize) -> Result<Vec<IndexHit>>;

    /// Number of indexed chunks
    async fn len(&self) -> Result<usize>;

    /// Check if the index is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
