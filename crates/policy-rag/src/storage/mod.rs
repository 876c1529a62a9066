//! Per-document persistence: pages, chunks, summaries, evaluation reports
//!
//! Each document gets its own directory under the store root, named by its
//! doc_id, so documents isolate naturally. Chunks are written append-once as
//! JSON lines and always loaded as a whole list; chunk ids round-trip
//! unchanged.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Chunk, ExtractedPage, PolicySummary};

pub const PAGES_FILENAME: &str = "pages.json";
pub const CHUNKS_FILENAME: &str = "chunks.jsonl";
pub const SUMMARY_FILENAME: &str = "policy_summary.json";
pub const FAITHFULNESS_REPORT_FILENAME: &str = "faithfulness_report.json";
pub const COMPLETENESS_REPORT_FILENAME: &str = "completeness_report.json";
pub const SIMPLICITY_REPORT_FILENAME: &str = "simplicity_report.json";
pub const EVALUATION_REPORT_FILENAME: &str = "evaluation_report.json";

/// Generate a unique id for a newly ingested document
pub fn generate_document_id() -> String {
    Uuid::new_v4().to_string()
}

/// Filesystem store with one directory per document
#[derive(Debug, Clone)]
pub struct DocStore {
    root: PathBuf,
}

impl DocStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory for a document, without creating it
    ///
    /// Doc ids never contain path separators; anything else is rejected
    /// before it can escape the store root.
    pub fn document_dir(&self, doc_id: &str) -> Result<PathBuf> {
        if doc_id.is_empty()
            || doc_id.contains('/')
            || doc_id.contains('\\')
            || doc_id == "."
            || doc_id == ".."
        {
            return Err(Error::Storage(format!("invalid document id: {doc_id:?}")));
        }
        Ok(self.root.join(doc_id))
    }

    fn ensure_dir(&self, doc_id: &str) -> Result<PathBuf> {
        let dir = self.document_dir(doc_id)?;
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn save_extracted_pages(&self, doc_id: &str, pages: &[ExtractedPage]) -> Result<PathBuf> {
        let path = self.ensure_dir(doc_id)?.join(PAGES_FILENAME);
        let raw = serde_json::to_string_pretty(pages)?;
        fs::write(&path, raw)?;
        Ok(path)
    }

    pub fn load_extracted_pages(&self, doc_id: &str) -> Result<Vec<ExtractedPage>> {
        let path = self.document_dir(doc_id)?.join(PAGES_FILENAME);
        self.read_json(&path, "extracted pages", doc_id)
    }

    /// Write chunks as JSON lines, one record per chunk
    pub fn save_chunks(&self, doc_id: &str, chunks: &[Chunk]) -> Result<PathBuf> {
        let path = self.ensure_dir(doc_id)?.join(CHUNKS_FILENAME);
        let mut file = fs::File::create(&path)?;
        for chunk in chunks {
            let line = serde_json::to_string(chunk)?;
            writeln!(file, "{line}")?;
        }
        debug!(doc_id, chunks = chunks.len(), "chunks persisted");
        Ok(path)
    }

    pub fn load_chunks(&self, doc_id: &str) -> Result<Vec<Chunk>> {
        let path = self.document_dir(doc_id)?.join(CHUNKS_FILENAME);
        if !path.exists() {
            return Err(Error::MissingData(format!("no chunks for document {doc_id}")));
        }

        let raw = fs::read_to_string(&path)?;
        let mut chunks = Vec::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            chunks.push(serde_json::from_str(line)?);
        }
        Ok(chunks)
    }

    pub fn save_summary(&self, doc_id: &str, summary: &PolicySummary) -> Result<PathBuf> {
        let path = self.ensure_dir(doc_id)?.join(SUMMARY_FILENAME);
        let raw = serde_json::to_string_pretty(summary)?;
        fs::write(&path, raw)?;
        Ok(path)
    }

    pub fn load_summary(&self, doc_id: &str) -> Result<PolicySummary> {
        let path = self.document_dir(doc_id)?.join(SUMMARY_FILENAME);
        self.read_json(&path, "policy summary", doc_id)
    }

    /// Persist an evaluation report next to the summary it audits
    pub fn save_report<T: Serialize>(&self, doc_id: &str, filename: &str, report: &T) -> Result<PathBuf> {
        let path = self.ensure_dir(doc_id)?.join(filename);
        let raw = serde_json::to_string_pretty(report)?;
        fs::write(&path, raw)?;
        Ok(path)
    }

    /// Remove every artifact for a document. Used for rollback and re-ingest.
    pub fn remove_document(&self, doc_id: &str) -> Result<()> {
        let dir = self.document_dir(doc_id)?;
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path, what: &str, doc_id: &str) -> Result<T> {
        if !path.exists() {
            return Err(Error::MissingData(format!("no {what} for document {doc_id}")));
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
