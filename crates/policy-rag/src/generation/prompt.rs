//! Prompt assembly for section summaries and Q&A

use crate::providers::vector_index::IndexHit;
use crate::types::{RetrievedChunk, SectionName};

/// Prompt builder for grounded generation
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build a context block from retrieved chunks
    ///
    /// Every chunk is labeled with its id and page so the model holds the
    /// exact keys it must cite with.
    pub fn build_context(chunks: &[RetrievedChunk]) -> String {
        let parts: Vec<String> = chunks
            .iter()
            .map(|rc| Self::format_chunk(&rc.chunk.chunk_id, rc.chunk.page_number, &rc.chunk.chunk_text))
            .collect();
        parts.join("\n").trim().to_string()
    }

    /// Build a context block from raw index hits (direct Q&A path)
    pub fn build_qa_context(hits: &[IndexHit]) -> String {
        let parts: Vec<String> = hits
            .iter()
            .map(|h| Self::format_chunk(&h.chunk_id, h.page_number, &h.chunk_text))
            .collect();
        parts.join("\n").trim().to_string()
    }

    fn format_chunk(chunk_id: &str, page: u32, text: &str) -> String {
        format!("---\nChunk {} (page {}):\n{}\n", chunk_id, page, text.trim())
    }

    /// Instruction for section summarization; demands a bare JSON object
    pub fn section_system_prompt() -> &'static str {
        "You are a policy document summarizer. Use ONLY the provided chunks. \
         You MUST output a single valid JSON object with exactly these keys: \
         \"present\": boolean (true if information for the section is found, false if not); \
         \"bullets\": a list of objects, each with \"text\" (the summary point in plain English) \
         and \"citations\" (a list of objects with \"chunk_id\" and \"page\"). \
         Never cite a chunk that was not provided. If nothing is relevant, return {\"present\": false, \"bullets\": []}."
    }

    pub fn section_user_prompt(section: SectionName, context: &str) -> String {
        format!("Summarize the section \"{section}\" using these chunks:\n\n{context}")
    }

    /// Instruction for grounded Q&A; demands a bare JSON object
    pub fn qa_system_prompt() -> &'static str {
        "You are a Q&A system for a single policy document. Answer using ONLY the provided chunks. \
         Output ONLY a valid JSON object of the form \
         {\"answer\": \"your text\", \"answer_type\": \"answerable\", \
         \"citations\": [{\"chunk_id\": \"c_1_0\", \"page\": 1}]}. \
         Valid answer_type values: answerable, not_found, ambiguous, conflict. \
         If the document does not contain the answer, use answer_type \"not_found\" with no citations."
    }

    pub fn qa_user_prompt(question: &str, context: &str) -> String {
        format!("Context:\n{context}\n\nQuestion: {question}")
    }
}
