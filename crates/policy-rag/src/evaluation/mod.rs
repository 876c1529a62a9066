//! The judge: validation, confidence, and post-hoc audit metrics
//!
//! Confidence runs inline with generation; faithfulness, completeness, and
//! simplicity run as a separate audit pass over persisted state, independent
//! of the live request path.

pub mod completeness;
pub mod confidence;
pub mod faithfulness;
pub mod simplicity;
pub mod validate;

pub use completeness::{compute_completeness, section_weight, CompletenessReport};
pub use confidence::{confidence_for_qa, confidence_for_section};
pub use faithfulness::{compute_faithfulness, FaithfulnessReport, UnitDetail};
pub use simplicity::{compute_simplicity, SimplicityReport};
pub use validate::{validate_qa_response, validate_section_summary};

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{DocStore, EVALUATION_REPORT_FILENAME};

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("valid regex"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z0-9]+").expect("valid regex"));

/// Round to 4 decimal places for stable, comparable report values
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub(crate) fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn count_sentences(text: &str) -> usize {
    sentences(text).len()
}

pub(crate) fn words(text: &str) -> Vec<&str> {
    WORD.find_iter(text).map(|m| m.as_str()).collect()
}

/// Combined result of the full audit suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub doc_id: String,
    pub faithfulness_score: f64,
    pub completeness_score: f64,
    pub simplicity_score: f64,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Runs every audit metric for a document and persists each report
pub struct EvaluationRunner {
    store: DocStore,
    jargon: HashSet<String>,
}

impl EvaluationRunner {
    pub fn new(store: DocStore, jargon: HashSet<String>) -> Self {
        Self { store, jargon }
    }

    /// Compute and persist all three reports, then a combined one
    ///
    /// Missing persisted state never raises here; each metric degrades to a
    /// zero score with an error marker collected into `errors`.
    pub fn run_all(&self, doc_id: &str) -> Result<EvaluationReport> {
        let faithfulness = compute_faithfulness(doc_id, &self.store)?;
        let completeness = compute_completeness(doc_id, &self.store)?;
        let simplicity = compute_simplicity(doc_id, &self.store, &self.jargon)?;

        self.store.save_report(
            doc_id,
            crate::storage::FAITHFULNESS_REPORT_FILENAME,
            &faithfulness,
        )?;
        self.store.save_report(
            doc_id,
            crate::storage::COMPLETENESS_REPORT_FILENAME,
            &completeness,
        )?;
        self.store
            .save_report(doc_id, crate::storage::SIMPLICITY_REPORT_FILENAME, &simplicity)?;

        let mut errors = Vec::new();
        if let Some(e) = &faithfulness.error {
            errors.push(format!("faithfulness:{e}"));
        }
        if let Some(e) = &completeness.error {
            errors.push(format!("completeness:{e}"));
        }
        if let Some(e) = &simplicity.error {
            errors.push(format!("simplicity:{e}"));
        }

        let report = EvaluationReport {
            doc_id: doc_id.to_string(),
            faithfulness_score: faithfulness.faithfulness_score,
            completeness_score: completeness.completeness_score,
            simplicity_score: simplicity.simplicity_score,
            errors,
        };
        self.store
            .save_report(doc_id, EVALUATION_REPORT_FILENAME, &report)?;
        Ok(report)
    }
}
