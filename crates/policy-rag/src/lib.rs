//! policy-rag: citation-grounded summarization core for policy documents
//!
//! This crate grounds generated answers about a document in that document's
//! actual text so every claim traces to a specific page. It covers the pieces
//! with real invariants to protect: a deterministic page-aware chunker, a
//! multi-query section retriever, the citation validator that strips any
//! generated citation retrieval cannot back, and the deterministic scoring
//! layer (confidence, faithfulness, completeness) that turns citation
//! coverage into trust signals.
//!
//! PDF extraction, the HTTP surface, and the text generator itself live
//! behind traits; see [`providers`].

pub mod config;
pub mod error;
pub mod evaluation;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod storage;
pub mod terminology;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, DocMetadata, ExtractedPage},
    query::{AnswerType, QaResponse, RetrievedChunk},
    summary::{
        Bullet, Citation, ConfidenceLevel, DetailLevel, PolicySummary, SectionName, SectionSummary,
    },
};
