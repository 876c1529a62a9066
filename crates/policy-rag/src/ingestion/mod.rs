//! Document ingestion: relevance check, cleanup, chunking, indexing

pub mod chunker;
pub mod cleaner;

pub use chunker::{chunk_pages, split_into_sentences};
pub use cleaner::clean_pages;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::providers::vector_index::VectorIndexProvider;
use crate::storage::{generate_document_id, DocStore};
use crate::types::ExtractedPage;

/// Terminology that marks a document as a plausible health insurance policy
pub const POLICY_KEYWORDS: &[&str] = &[
    // General identifiers
    "summary of benefits",
    "evidence of coverage",
    "policy number",
    "group number",
    // Financial terms (cost sharing)
    "deductible",
    "coinsurance",
    "copayment",
    "out-of-pocket",
    "annual limit",
    "maximum out of pocket",
    "premium",
    "cost-sharing",
    // Service categories
    "primary care",
    "specialist visit",
    "emergency room",
    "urgent care",
    "inpatient hospital",
    "outpatient surgery",
    "preventive care",
    // Pharmacy
    "prescription drug",
    "formulary",
    "generic drug",
    "preferred brand",
    "mail order",
    // Managed care and admin
    "prior authorization",
    "pre-authorization",
    "referral",
    "network provider",
    "non-preferred provider",
    "medically necessary",
    "exclusions",
    "limitations",
];

/// Unique keyword matches required to accept an upload
const MIN_KEYWORD_MATCHES: usize = 10;

/// Pages sampled for the relevance check; summaries live up front
const RELEVANCE_SAMPLE_PAGES: usize = 3;

/// Scan text for insurance-specific terminology
pub fn is_likely_policy(text: &str) -> bool {
    let lower = text.to_lowercase();
    let matches = POLICY_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .count();
    matches >= MIN_KEYWORD_MATCHES
}

/// End-to-end ingestion for one document's extracted pages
///
/// PDF parsing belongs to the external extractor; ingestion starts from the
/// page list it produced.
pub struct Ingestor {
    index: Arc<dyn VectorIndexProvider>,
    store: DocStore,
    chunking: ChunkingConfig,
}

impl Ingestor {
    pub fn new(index: Arc<dyn VectorIndexProvider>, store: DocStore, chunking: ChunkingConfig) -> Self {
        Self {
            index,
            store,
            chunking,
        }
    }

    /// Run the ingestion pipeline and return the new document id
    ///
    /// Any failure rolls back every artifact already written for the
    /// document id before the error surfaces. Indexing replaces whatever
    /// document was active before; callers serialize ingestion against
    /// querying.
    pub async fn run_ingest(&self, pages: Vec<ExtractedPage>) -> Result<String> {
        let doc_id = generate_document_id();

        match self.ingest_inner(&doc_id, pages).await {
            Ok(()) => Ok(doc_id),
            Err(e) => {
                if let Err(cleanup) = self.store.remove_document(&doc_id) {
                    warn!(doc_id = %doc_id, error = %cleanup, "rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn ingest_inner(&self, doc_id: &str, pages: Vec<ExtractedPage>) -> Result<()> {
        if pages.is_empty() || pages.iter().all(|p| p.text.trim().is_empty()) {
            return Err(Error::Ingestion("document has no extractable text".to_string()));
        }

        let pages = clean_pages(pages);

        let sample: String = pages
            .iter()
            .take(RELEVANCE_SAMPLE_PAGES)
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if !is_likely_policy(&sample) {
            return Err(Error::Validation(
                "this document does not appear to be a health insurance policy or summary of benefits"
                    .to_string(),
            ));
        }

        self.store.save_extracted_pages(doc_id, &pages)?;

        let chunks = chunk_pages(&pages, doc_id, &self.chunking);
        if chunks.is_empty() {
            return Err(Error::Ingestion("document produced no chunks".to_string()));
        }

        self.store.save_chunks(doc_id, &chunks)?;
        self.index.replace(doc_id, &chunks).await?;

        info!(
            doc_id,
            pages = pages.len(),
            chunks = chunks.len(),
            "document ingested"
        );
        Ok(())
    }
}
