//! Simplicity: did the summary actually get easier to read?
//!
//! Compares the generated summary text against the original document on
//! sentence length, jargon rate, and Flesch reading ease. Each component is
//! clamped to [0, 1] and the score is their mean.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::DocStore;

use super::{round4, sentences, words};

static VOWEL_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[aeiouy]+").expect("valid regex"));

/// Load a jargon term list from a JSON array file. Missing or invalid files
/// yield an empty set.
pub fn load_jargon_terms(path: &Path) -> HashSet<String> {
    if !path.exists() {
        return HashSet::new();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "jargon list unreadable");
            return HashSet::new();
        }
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(terms) => terms.into_iter().map(|t| t.to_lowercase()).collect(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "jargon list invalid");
            HashSet::new()
        }
    }
}

fn approx_syllables(word: &str) -> usize {
    std::cmp::max(1, VOWEL_RUNS.find_iter(&word.to_lowercase()).count())
}

fn flesch_reading_ease(text: &str) -> f64 {
    let sentence_list = sentences(text);
    let word_list = words(text);
    if sentence_list.is_empty() || word_list.is_empty() {
        return 0.0;
    }
    let syllables: usize = word_list.iter().map(|w| approx_syllables(w)).sum();
    206.835
        - 1.015 * (word_list.len() as f64 / sentence_list.len() as f64)
        - 84.6 * (syllables as f64 / word_list.len() as f64)
}

fn jargon_rate(text: &str, jargon: &HashSet<String>) -> f64 {
    let tokens: HashSet<String> = words(text).iter().map(|w| w.to_lowercase()).collect();
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = tokens.iter().filter(|t| jargon.contains(*t)).count();
    hits as f64 / tokens.len() as f64
}

fn avg_words_per_sentence(text: &str) -> f64 {
    let sentence_list = sentences(text);
    if sentence_list.is_empty() {
        return 0.0;
    }
    let total: usize = sentence_list.iter().map(|s| words(s).len()).sum();
    total as f64 / sentence_list.len() as f64
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Result of a simplicity audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplicityReport {
    pub doc_id: String,
    pub simplicity_score: f64,
    pub sentence_length_original: f64,
    pub sentence_length_summary: f64,
    pub sentence_length_reduction: f64,
    pub jargon_rate_original: f64,
    pub jargon_rate_summary: f64,
    pub jargon_reduction: f64,
    pub flesch_original: f64,
    pub flesch_summary: f64,
    pub flesch_improvement: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimplicityReport {
    fn degraded(doc_id: &str, error: &str) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            simplicity_score: 0.0,
            sentence_length_original: 0.0,
            sentence_length_summary: 0.0,
            sentence_length_reduction: 0.0,
            jargon_rate_original: 0.0,
            jargon_rate_summary: 0.0,
            jargon_reduction: 0.0,
            flesch_original: 0.0,
            flesch_summary: 0.0,
            flesch_improvement: 0.0,
            error: Some(error.to_string()),
        }
    }
}

/// Score summary text against the original document text
pub fn score_texts(
    doc_id: &str,
    original_text: &str,
    summary_text: &str,
    jargon: &HashSet<String>,
) -> SimplicityReport {
    let avg_original = avg_words_per_sentence(original_text);
    let avg_summary = avg_words_per_sentence(summary_text);
    let sentence_reduction = if avg_original > 0.0 {
        clamp01((avg_original - avg_summary) / avg_original)
    } else {
        0.0
    };

    let jargon_original = jargon_rate(original_text, jargon);
    let jargon_summary = jargon_rate(summary_text, jargon);
    let jargon_reduction = if jargon_original > 0.0 {
        clamp01((jargon_original - jargon_summary) / jargon_original)
    } else {
        0.0
    };

    let flesch_original = flesch_reading_ease(original_text);
    let flesch_summary = flesch_reading_ease(summary_text);
    let flesch_improvement = if flesch_original <= 100.0 {
        clamp01((flesch_summary - flesch_original) / 100.0)
    } else {
        0.0
    };

    let score = clamp01((sentence_reduction + jargon_reduction + flesch_improvement) / 3.0);

    SimplicityReport {
        doc_id: doc_id.to_string(),
        simplicity_score: round4(score),
        sentence_length_original: round4(avg_original),
        sentence_length_summary: round4(avg_summary),
        sentence_length_reduction: round4(sentence_reduction),
        jargon_rate_original: round4(jargon_original),
        jargon_rate_summary: round4(jargon_summary),
        jargon_reduction: round4(jargon_reduction),
        flesch_original: round4(flesch_original),
        flesch_summary: round4(flesch_summary),
        flesch_improvement: round4(flesch_improvement),
        error: None,
    }
}

/// Load persisted pages and summary, then score
pub fn compute_simplicity(
    doc_id: &str,
    store: &DocStore,
    jargon: &HashSet<String>,
) -> Result<SimplicityReport> {
    let pages = match store.load_extracted_pages(doc_id) {
        Ok(pages) => pages,
        Err(Error::MissingData(_)) => return Ok(SimplicityReport::degraded(doc_id, "pages_not_found")),
        Err(e) => return Err(e),
    };
    let summary = match store.load_summary(doc_id) {
        Ok(summary) => summary,
        Err(Error::MissingData(_)) => {
            return Ok(SimplicityReport::degraded(doc_id, "policy_summary_not_found"))
        }
        Err(e) => return Err(e),
    };

    let original_text = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let summary_text = summary
        .sections
        .iter()
        .flat_map(|s| s.bullets.iter())
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(score_texts(doc_id, &original_text, &summary_text, jargon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jargon() -> HashSet<String> {
        ["coinsurance", "formulary", "subrogation"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn shorter_plainer_summary_scores_positive() {
        let original = "The member shall be responsible for coinsurance obligations and \
                        formulary adherence pursuant to subrogation provisions enumerated \
                        within the governing plan documentation and applicable riders thereto.";
        let summary = "You pay part of each bill. The drug list controls coverage.";
        let report = score_texts("doc", original, summary, &jargon());
        assert!(report.simplicity_score > 0.0);
        assert!(report.sentence_length_summary < report.sentence_length_original);
        assert!(report.jargon_rate_summary < report.jargon_rate_original);
    }

    #[test]
    fn empty_texts_score_zero() {
        let report = score_texts("doc", "", "", &jargon());
        assert_eq!(report.simplicity_score, 0.0);
    }

    #[test]
    fn syllable_estimate_floors_at_one() {
        assert_eq!(approx_syllables("hmm"), 1);
        assert!(approx_syllables("coinsurance") >= 3);
    }

    #[test]
    fn missing_pages_degrade_with_error_marker() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocStore::new(dir.path());
        let report = compute_simplicity("ghost", &store, &jargon()).unwrap();
        assert_eq!(report.simplicity_score, 0.0);
        assert_eq!(report.error.as_deref(), Some("pages_not_found"));
    }
}
