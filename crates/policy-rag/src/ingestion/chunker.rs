//! Page-aware text chunking with sentence overlap
//!
//! Chunks never cross a page boundary; citation accuracy depends on every
//! chunk knowing exactly which page it came from.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ChunkingConfig;
use crate::types::{Chunk, ExtractedPage};

// Sentence terminator followed by whitespace. The terminator stays with the
// sentence it closes.
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

/// Fast token estimate: 4 chars per token. Only drives the soft packing
/// threshold, never an exact model limit.
fn approx_tokens(text: &str) -> usize {
    text.trim().len() / 4
}

/// Split text into sentences on punctuation boundaries, keeping the
/// terminating punctuation with each sentence
pub fn split_into_sentences(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // the matched terminator is a single ASCII char
        let end = boundary.start() + 1;
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = boundary.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Chunk one page's text
///
/// Sentences accumulate into a window until adding the next one would exceed
/// the token bound; the window closes as a chunk and the next window is
/// seeded with an exact suffix of the closed one so context survives the cut.
/// A page with no usable sentences still yields exactly one chunk so the
/// addressing scheme stays total.
fn chunk_page_text(page_number: u32, doc_id: &str, text: &str, cfg: &ChunkingConfig) -> Vec<Chunk> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return vec![Chunk::new(page_number, 0, doc_id, "")];
    }

    let sentences = split_into_sentences(text);
    if sentences.is_empty() {
        return vec![Chunk::new(page_number, 0, doc_id, trimmed)];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_tokens = 0usize;
    let mut chunk_index = 0u32;

    for sentence in sentences {
        let sentence_tokens = approx_tokens(&sentence);

        if !current.is_empty() && current_tokens + sentence_tokens > cfg.max_tokens {
            chunks.push(Chunk::new(page_number, chunk_index, doc_id, current.join(" ")));
            chunk_index += 1;

            // Walk backward through the closed window until the overlap
            // budget is met; these sentences become the next window's prefix.
            let mut overlap: Vec<String> = Vec::new();
            let mut overlap_tokens = 0usize;
            for prior in current.iter().rev() {
                overlap_tokens += approx_tokens(prior);
                overlap.insert(0, prior.clone());
                if overlap_tokens >= cfg.overlap_tokens {
                    break;
                }
            }
            current = overlap;
            current_tokens = overlap_tokens;
        }

        current.push(sentence);
        current_tokens += sentence_tokens;
    }

    if !current.is_empty() {
        chunks.push(Chunk::new(page_number, chunk_index, doc_id, current.join(" ")));
    }

    chunks
}

/// Chunk a list of pages into a flat, page-ordered chunk list
///
/// Deterministic and idempotent: identical input yields identical chunk ids
/// and boundaries.
pub fn chunk_pages(pages: &[ExtractedPage], doc_id: &str, cfg: &ChunkingConfig) -> Vec<Chunk> {
    pages
        .iter()
        .flat_map(|page| chunk_page_text(page.page_number, doc_id, &page.text, cfg))
        .collect()
}
