//! Citation validation: the single anti-hallucination checkpoint
//!
//! Generated citations are untrusted input. A citation survives only when its
//! page is plausible and its chunk_id is one the generator actually saw in
//! its context. This filter runs at every boundary where generated text
//! claims a source.

use std::collections::HashSet;

use crate::types::{Citation, RetrievedChunk};

use super::parser::DraftCitation;

/// Result of filtering untrusted citations against the retrieval allow-set
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilteredCitations {
    /// Citations that passed both checks, in input order
    pub kept: Vec<Citation>,
    /// One issue string per failed check, in input order. Never silently
    /// discarded: callers record these and let them degrade confidence.
    pub issues: Vec<String>,
}

/// The allow-set for a retrieval result: exactly the chunk ids the generator
/// was shown
pub fn allowed_ids(chunks: &[RetrievedChunk]) -> HashSet<String> {
    chunks.iter().map(|rc| rc.chunk.chunk_id.clone()).collect()
}

/// Keep candidates whose page is valid (>= 1) and whose chunk_id is in the
/// allow-set. Both checks run for every candidate; failing either drops it.
pub fn validate_citations(
    candidates: &[DraftCitation],
    allowed: &HashSet<String>,
) -> FilteredCitations {
    let mut out = FilteredCitations::default();

    for candidate in candidates {
        let mut valid = true;

        if candidate.page < 1 {
            out.issues.push(format!("invalid_page:{}", candidate.page));
            valid = false;
        }
        if candidate.chunk_id.is_empty() || !allowed.contains(&candidate.chunk_id) {
            out.issues
                .push(format!("invalid_chunk_id:{}", candidate.chunk_id));
            valid = false;
        }

        if valid {
            out.kept.push(Citation {
                page: candidate.page as u32,
                chunk_id: candidate.chunk_id.clone(),
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn draft(page: i64, chunk_id: &str) -> DraftCitation {
        DraftCitation {
            page,
            chunk_id: chunk_id.to_string(),
        }
    }

    #[test]
    fn valid_citation_is_kept() {
        let filtered = validate_citations(&[draft(2, "c_2_0")], &allow(&["c_2_0", "c_3_1"]));
        assert_eq!(filtered.kept.len(), 1);
        assert_eq!(filtered.kept[0].page, 2);
        assert_eq!(filtered.kept[0].chunk_id, "c_2_0");
        assert!(filtered.issues.is_empty());
    }

    #[test]
    fn nonpositive_page_is_dropped_regardless_of_chunk_id() {
        let filtered = validate_citations(&[draft(0, "c_2_0"), draft(-3, "c_2_0")], &allow(&["c_2_0"]));
        assert!(filtered.kept.is_empty());
        assert_eq!(filtered.issues.len(), 2);
        assert!(filtered.issues.iter().all(|i| i.starts_with("invalid_page:")));
    }

    #[test]
    fn unretrieved_chunk_is_dropped_regardless_of_page() {
        let filtered = validate_citations(&[draft(2, "c_9_9")], &allow(&["c_2_0"]));
        assert!(filtered.kept.is_empty());
        assert_eq!(filtered.issues, vec!["invalid_chunk_id:c_9_9".to_string()]);
    }

    #[test]
    fn empty_chunk_id_is_dropped() {
        let filtered = validate_citations(&[draft(1, "")], &allow(&["c_1_0"]));
        assert!(filtered.kept.is_empty());
        assert_eq!(filtered.issues, vec!["invalid_chunk_id:".to_string()]);
    }

    #[test]
    fn both_checks_fail_independently() {
        let filtered = validate_citations(&[draft(0, "c_9_9")], &allow(&["c_1_0"]));
        assert!(filtered.kept.is_empty());
        assert_eq!(filtered.issues.len(), 2);
    }

    #[test]
    fn order_of_kept_citations_is_input_order() {
        let filtered = validate_citations(
            &[draft(1, "c_1_0"), draft(5, "c_5_2"), draft(3, "c_3_0")],
            &allow(&["c_1_0", "c_3_0", "c_5_2"]),
        );
        let ids: Vec<&str> = filtered.kept.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["c_1_0", "c_5_2", "c_3_0"]);
    }
}
