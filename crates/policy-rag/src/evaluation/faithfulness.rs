//! Faithfulness: verify every cited bullet against its source chunk
//!
//! Runs post-hoc over persisted state. The per-unit trail is a first-class
//! output for auditing which claims were and were not supported, not a log
//! side effect.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::DocStore;
use crate::types::{Chunk, PolicySummary};

use super::round4;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("valid regex"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.?\d*").expect("valid regex"));

/// Minimum fraction of bullet tokens that must appear in the cited chunk
const MIN_OVERLAP: f64 = 0.15;

/// Characters of bullet text kept in the audit trail
const PREVIEW_CHARS: usize = 80;

fn normalize_tokens(text: &str) -> HashSet<String> {
    TOKEN
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

fn extract_numbers(text: &str) -> HashSet<String> {
    NUMBER.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Does this chunk's text support the bullet?
///
/// Two tests, either suffices: (a) at least 15% of the bullet's word tokens
/// appear in the chunk, or (b) every numeric token in the bullet appears
/// among the chunk's numeric tokens. The second test exists because exact
/// dollar and percentage figures are the facts most worth verifying, and they
/// can sit in a sentence whose other words barely overlap.
pub fn chunk_supports_bullet(bullet_text: &str, chunk_text: &str) -> bool {
    let bullet_tokens = normalize_tokens(bullet_text);
    if bullet_tokens.is_empty() {
        return true;
    }

    let chunk_tokens = normalize_tokens(chunk_text);
    let overlap = bullet_tokens.intersection(&chunk_tokens).count();
    if overlap as f64 / bullet_tokens.len() as f64 >= MIN_OVERLAP {
        return true;
    }

    let bullet_numbers = extract_numbers(bullet_text);
    !bullet_numbers.is_empty() && bullet_numbers.is_subset(&extract_numbers(chunk_text))
}

/// One audited summary unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDetail {
    pub section: String,
    pub text_preview: String,
    pub supported: bool,
    /// "supported", "no_citations", "chunk_missing:{id}", or "low_overlap"
    pub reason: String,
}

/// Result of a faithfulness audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaithfulnessReport {
    pub doc_id: String,
    pub faithfulness_score: f64,
    pub hallucination_rate: f64,
    /// True unit count; 0 when the summary has no bullets at all
    pub total_units: usize,
    pub supported_units: usize,
    #[serde(default)]
    pub unit_details: Vec<UnitDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FaithfulnessReport {
    fn degraded(doc_id: &str, error: &str) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            faithfulness_score: 0.0,
            hallucination_rate: 0.0,
            total_units: 0,
            supported_units: 0,
            unit_details: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Audit a summary against its chunk list
///
/// A bullet is supported when any one of its citations points at a stored
/// chunk that passes either support test. The score divides by
/// max(total, 1): a summary with no bullets scores 0.0 instead of erroring.
pub fn score_summary(doc_id: &str, summary: &PolicySummary, chunks: &[Chunk]) -> FaithfulnessReport {
    let chunks_by_id: HashMap<&str, &Chunk> =
        chunks.iter().map(|c| (c.chunk_id.as_str(), c)).collect();

    let mut total_units = 0usize;
    let mut supported_units = 0usize;
    let mut unit_details = Vec::new();

    for section in &summary.sections {
        if !section.present || section.bullets.is_empty() {
            continue;
        }
        for bullet in &section.bullets {
            total_units += 1;

            if bullet.citations.is_empty() {
                unit_details.push(UnitDetail {
                    section: section.section_name.as_str().to_string(),
                    text_preview: preview(&bullet.text),
                    supported: false,
                    reason: "no_citations".to_string(),
                });
                continue;
            }

            let mut supported = false;
            let mut first_missing: Option<&str> = None;
            let mut any_chunk_found = false;

            for citation in &bullet.citations {
                match chunks_by_id.get(citation.chunk_id.as_str()) {
                    None => {
                        first_missing.get_or_insert(citation.chunk_id.as_str());
                    }
                    Some(chunk) => {
                        any_chunk_found = true;
                        if chunk_supports_bullet(&bullet.text, &chunk.chunk_text) {
                            supported = true;
                            break;
                        }
                    }
                }
            }

            let reason = if supported {
                supported_units += 1;
                "supported".to_string()
            } else if !any_chunk_found {
                match first_missing {
                    Some(id) => format!("chunk_missing:{id}"),
                    None => "low_overlap".to_string(),
                }
            } else {
                "low_overlap".to_string()
            };

            unit_details.push(UnitDetail {
                section: section.section_name.as_str().to_string(),
                text_preview: preview(&bullet.text),
                supported,
                reason,
            });
        }
    }

    let denominator = std::cmp::max(total_units, 1) as f64;
    FaithfulnessReport {
        doc_id: doc_id.to_string(),
        faithfulness_score: round4(supported_units as f64 / denominator),
        hallucination_rate: round4((total_units - supported_units) as f64 / denominator),
        total_units,
        supported_units,
        unit_details,
        error: None,
    }
}

/// Load persisted state and audit it
///
/// Missing summary or chunks degrade to a zero-score report with an error
/// marker; structural failures still propagate.
pub fn compute_faithfulness(doc_id: &str, store: &DocStore) -> Result<FaithfulnessReport> {
    let summary = match store.load_summary(doc_id) {
        Ok(summary) => summary,
        Err(Error::MissingData(_)) => {
            return Ok(FaithfulnessReport::degraded(doc_id, "policy_summary_not_found"))
        }
        Err(e) => return Err(e),
    };
    let chunks = match store.load_chunks(doc_id) {
        Ok(chunks) => chunks,
        Err(Error::MissingData(_)) => {
            return Ok(FaithfulnessReport::degraded(doc_id, "chunks_not_found"))
        }
        Err(e) => return Err(e),
    };
    Ok(score_summary(doc_id, &summary, &chunks))
}
