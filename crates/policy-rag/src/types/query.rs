//! Retrieval and question-answering types

use serde::{Deserialize, Serialize};

use super::document::Chunk;
use super::summary::{Citation, ConfidenceLevel, NOT_FOUND_MESSAGE};

/// Disclaimer attached to every Q&A response
pub const QA_DISCLAIMER: &str =
    "This explanation is for informational purposes only. Refer to official policy documents.";

/// A chunk returned by retrieval, tagged with its match distance and the
/// section it was fetched for. Transient; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    /// Distance reported by the index; smaller is closer. None when the
    /// backend does not report one.
    pub distance: Option<f32>,
    pub section: String,
}

/// Classification of a Q&A answer, used to pick rendering and confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    /// Direct answer found in the document
    Answerable,
    /// Information missing from the document
    NotFound,
    /// The document is unclear
    Ambiguous,
    /// Two parts of the document disagree
    Conflict,
    /// Deep dive into one policy section
    SectionDetail,
}

impl AnswerType {
    /// Parse the generator's string form; anything unknown reads as NotFound
    pub fn parse(raw: &str) -> Self {
        match raw {
            "answerable" => AnswerType::Answerable,
            "ambiguous" => AnswerType::Ambiguous,
            "conflict" => AnswerType::Conflict,
            "section_detail" => AnswerType::SectionDetail,
            _ => AnswerType::NotFound,
        }
    }
}

/// A grounded answer to a user question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaResponse {
    pub doc_id: String,
    pub question: String,
    pub answer: String,
    pub answer_type: AnswerType,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub confidence: ConfidenceLevel,
    pub disclaimer: String,
    #[serde(default)]
    pub validation_issues: Vec<String>,
}

impl QaResponse {
    /// The deterministic degraded response when nothing in the document
    /// supports an answer
    pub fn not_found(doc_id: &str, question: &str, issues: Vec<String>) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            question: question.to_string(),
            answer: NOT_FOUND_MESSAGE.to_string(),
            answer_type: AnswerType::NotFound,
            citations: Vec::new(),
            confidence: ConfidenceLevel::Low,
            disclaimer: QA_DISCLAIMER.to_string(),
            validation_issues: issues,
        }
    }
}
