//! Core value objects shared across the pipeline

pub mod document;
pub mod query;
pub mod summary;

pub use document::{Chunk, DocMetadata, ExtractedPage};
pub use query::{AnswerType, QaResponse, RetrievedChunk, QA_DISCLAIMER};
pub use summary::{
    Bullet, Citation, ConfidenceLevel, DetailLevel, PolicySummary, SectionName, SectionSummary,
    DEFAULT_DISCLAIMER, NOT_FOUND_MESSAGE,
};
