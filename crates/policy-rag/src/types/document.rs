//! Page and chunk types with page tracking for citations

use serde::{Deserialize, Serialize};

/// Raw text of a single extracted page
///
/// Pages are 1-indexed and immutable once extraction finishes. The external
/// extractor produces one of these per physical page, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// 1-based page number
    pub page_number: u32,
    /// Full cleaned text of the page
    #[serde(default)]
    pub text: String,
}

impl ExtractedPage {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// A citation-addressable, single-page segment of document text
///
/// `chunk_id` has the fixed form `c_{page_number}_{index}` where `index` is a
/// zero-based, page-local counter. A chunk never spans two pages; citation
/// accuracy depends on this. Chunks are created once during ingestion and are
/// immutable; a re-ingest supersedes them under a fresh `doc_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique ID of the form `c_{page}_{index}`
    pub chunk_id: String,
    /// 1-based page number this chunk was cut from
    pub page_number: u32,
    /// ID of the parent document
    pub doc_id: String,
    /// Text content used for embedding and support checks
    pub chunk_text: String,
}

impl Chunk {
    /// Create a chunk with its canonical id
    pub fn new(page_number: u32, index: u32, doc_id: &str, chunk_text: impl Into<String>) -> Self {
        Self {
            chunk_id: format!("c_{page_number}_{index}"),
            page_number,
            doc_id: doc_id.to_string(),
            chunk_text: chunk_text.into(),
        }
    }
}

/// Identity of a processed document, persisted alongside its summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMetadata {
    pub doc_id: String,
    /// Generation timestamp, for versioning the audit trail
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}
