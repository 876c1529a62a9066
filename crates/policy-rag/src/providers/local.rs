//! In-process vector index with a single active document

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Chunk;

use super::embedding::EmbeddingProvider;
use super::vector_index::{IndexHit, VectorIndexProvider};

struct IndexedChunk {
    chunk_id: String,
    page_number: u32,
    chunk_text: String,
    embedding: Vec<f32>,
}

struct ActiveDocument {
    doc_id: String,
    entries: Vec<IndexedChunk>,
}

/// Brute-force cosine index over an embedding provider
///
/// Exactly one document is live at a time; `replace` embeds the new
/// document's chunks and swaps them in atomically, discarding the previous
/// document. Queries scoped to a non-active document return nothing.
pub struct LocalVectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    active: RwLock<Option<ActiveDocument>>,
}

impl LocalVectorIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            active: RwLock::new(None),
        }
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl VectorIndexProvider for LocalVectorIndex {
    async fn replace(&self, doc_id: &str, chunks: &[Chunk]) -> Result<()> {
        let texts: Vec<String> = chunks.iter().map(|c| c.chunk_text.clone()).collect();
        // embed outside the lock; only the swap needs exclusivity
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::VectorIndex(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let entries: Vec<IndexedChunk> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk {
                chunk_id: chunk.chunk_id.clone(),
                page_number: chunk.page_number,
                chunk_text: chunk.chunk_text.clone(),
                embedding,
            })
            .collect();

        let count = entries.len();
        *self.active.write() = Some(ActiveDocument {
            doc_id: doc_id.to_string(),
            entries,
        });
        info!(doc_id, chunks = count, "index rebuilt");
        Ok(())
    }

    async fn query(&self, doc_id: &str, text: &str, top_k: usize) -> Result<Vec<IndexHit>> {
        if text.trim().is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(text).await?;

        let guard = self.active.read();
        let Some(active) = guard.as_ref() else {
            return Ok(Vec::new());
        };
        if active.doc_id != doc_id {
            debug!(
                requested = doc_id,
                active = %active.doc_id,
                "query for non-active document"
            );
            return Ok(Vec::new());
        }

        let mut hits: Vec<IndexHit> = active
            .entries
            .iter()
            .map(|entry| IndexHit {
                chunk_id: entry.chunk_id.clone(),
                page_number: entry.page_number,
                chunk_text: entry.chunk_text.clone(),
                distance: Some(cosine_distance(&query_embedding, &entry.embedding)),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .unwrap_or(f32::MAX)
                .total_cmp(&b.distance.unwrap_or(f32::MAX))
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.active.read().as_ref().map_or(0, |a| a.entries.len()))
    }

    async fn health_check(&self) -> Result<bool> {
        self.embedder.health_check().await
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic bag-of-words embedder over a tiny fixed vocabulary
    struct VocabEmbedder;

    const VOCAB: &[&str] = &["deductible", "copay", "referral", "exclusions", "claim"];

    #[async_trait]
    impl EmbeddingProvider for VocabEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(VOCAB
                .iter()
                .map(|word| lower.matches(word).count() as f32)
                .collect())
        }

        fn dimensions(&self) -> usize {
            VOCAB.len()
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "vocab"
        }
    }

    fn index() -> LocalVectorIndex {
        LocalVectorIndex::new(Arc::new(VocabEmbedder))
    }

    fn chunks(doc_id: &str) -> Vec<Chunk> {
        vec![
            Chunk::new(1, 0, doc_id, "The deductible is $500 per year."),
            Chunk::new(2, 0, doc_id, "A referral is required for specialists."),
            Chunk::new(3, 0, doc_id, "Exclusions are listed in the appendix."),
        ]
    }

    #[tokio::test]
    async fn query_finds_nearest_chunk() {
        let index = index();
        index.replace("doc-1", &chunks("doc-1")).await.unwrap();

        let hits = index.query("doc-1", "what is the deductible", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id, "c_1_0");
        assert!(hits[0].distance.unwrap() < 0.5);
    }

    #[tokio::test]
    async fn replace_discards_previous_document() {
        let index = index();
        index.replace("doc-1", &chunks("doc-1")).await.unwrap();
        index
            .replace("doc-2", &[Chunk::new(1, 0, "doc-2", "claim filing steps")])
            .await
            .unwrap();

        assert_eq!(index.len().await.unwrap(), 1);
        let stale = index.query("doc-1", "deductible", 3).await.unwrap();
        assert!(stale.is_empty());
    }

    #[tokio::test]
    async fn query_for_non_active_document_is_empty() {
        let index = index();
        index.replace("doc-1", &chunks("doc-1")).await.unwrap();
        let hits = index.query("other-doc", "deductible", 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn empty_query_returns_nothing() {
        let index = index();
        index.replace("doc-1", &chunks("doc-1")).await.unwrap();
        assert!(index.query("doc-1", "   ", 3).await.unwrap().is_empty());
    }
}
