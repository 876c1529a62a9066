//! Completeness: weighted coverage of the canonical sections

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::DocStore;
use crate::types::{PolicySummary, SectionName, SectionSummary};

use super::round4;

/// Fixed weight per canonical section, summing to 1.0
///
/// Cost-related sections carry the most weight; they drive the decisions
/// readers actually make with a policy summary.
pub fn section_weight(section: SectionName) -> f64 {
    match section {
        SectionName::PlanSnapshot => 0.05,
        SectionName::CostSummary => 0.35,
        SectionName::CoveredServices => 0.30,
        SectionName::AdministrativeConditions => 0.15,
        SectionName::ExclusionsLimitations => 0.10,
        SectionName::ClaimsAppealsRights => 0.05,
    }
}

/// Is this section meaningfully addressed?
///
/// An explicit not-present declaration counts: the generator honestly saying
/// "this document has no such section" is coverage, not a gap. A present
/// section counts only when at least one bullet carries a citation.
pub fn section_addressed(section: &SectionSummary) -> bool {
    if !section.present {
        return true;
    }
    if section.bullets.is_empty() {
        return false;
    }
    section.bullets.iter().any(|b| !b.citations.is_empty())
}

/// Result of a completeness audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub doc_id: String,
    pub completeness_score: f64,
    /// 1.0 or 0.0 per section, keyed by canonical name
    #[serde(default)]
    pub section_scores: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Score a summary against the fixed weight table
pub fn score_summary(doc_id: &str, summary: &PolicySummary) -> CompletenessReport {
    let total_weight: f64 = SectionName::ALL.iter().map(|s| section_weight(*s)).sum();

    let mut section_scores = BTreeMap::new();
    let mut weighted_sum = 0.0;
    for section in &summary.sections {
        let addressed = if section_addressed(section) { 1.0 } else { 0.0 };
        section_scores.insert(section.section_name.as_str().to_string(), addressed);
        weighted_sum += section_weight(section.section_name) * addressed;
    }

    CompletenessReport {
        doc_id: doc_id.to_string(),
        completeness_score: round4(weighted_sum / total_weight),
        section_scores,
        error: None,
    }
}

/// Load the persisted summary and score it
///
/// A missing summary degrades to score 0.0 with an error marker, never an
/// exception.
pub fn compute_completeness(doc_id: &str, store: &DocStore) -> Result<CompletenessReport> {
    let summary = match store.load_summary(doc_id) {
        Ok(summary) => summary,
        Err(Error::MissingData(_)) => {
            return Ok(CompletenessReport {
                doc_id: doc_id.to_string(),
                completeness_score: 0.0,
                section_scores: BTreeMap::new(),
                error: Some("policy_summary_not_found".to_string()),
            })
        }
        Err(e) => return Err(e),
    };
    Ok(score_summary(doc_id, &summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bullet, Citation, ConfidenceLevel, DocMetadata};

    fn section(name: SectionName, present: bool, cited: bool) -> SectionSummary {
        let bullets = if present {
            vec![Bullet {
                text: "Point.".to_string(),
                citations: if cited {
                    vec![Citation {
                        page: 1,
                        chunk_id: "c_1_0".to_string(),
                    }]
                } else {
                    Vec::new()
                },
            }]
        } else {
            Vec::new()
        };
        SectionSummary {
            section_name: name,
            present,
            bullets,
            not_found_message: None,
            confidence: ConfidenceLevel::Medium,
            validation_issues: Vec::new(),
        }
    }

    fn summary_with(sections: Vec<SectionSummary>) -> PolicySummary {
        PolicySummary {
            metadata: DocMetadata {
                doc_id: "doc".to_string(),
                generated_at: chrono::Utc::now(),
                total_pages: 1,
                source_file: None,
            },
            disclaimer: "D".to_string(),
            sections,
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let total: f64 = SectionName::ALL.iter().map(|s| section_weight(*s)).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn only_cost_summary_addressed_scores_its_weight() {
        let sections = SectionName::ALL
            .iter()
            .map(|&name| {
                let addressed = name == SectionName::CostSummary;
                section(name, addressed, addressed)
            })
            .collect();
        let report = score_summary("doc", &summary_with(sections));
        assert_eq!(report.completeness_score, 0.35);
        assert_eq!(report.section_scores["Cost Summary"], 1.0);
        assert_eq!(report.section_scores["Plan Snapshot"], 0.0);
    }

    #[test]
    fn honest_absence_counts_as_addressed() {
        let sections = SectionName::ALL
            .iter()
            .map(|&name| section(name, false, false))
            .collect();
        let report = score_summary("doc", &summary_with(sections));
        assert_eq!(report.completeness_score, 1.0);
    }

    #[test]
    fn present_but_uncited_section_is_a_gap() {
        let sections = vec![section(SectionName::CostSummary, true, false)];
        let report = score_summary("doc", &summary_with(sections));
        assert_eq!(report.completeness_score, 0.0);
        assert_eq!(report.section_scores["Cost Summary"], 0.0);
    }

    #[test]
    fn fully_addressed_summary_scores_one() {
        let sections = SectionName::ALL
            .iter()
            .map(|&name| section(name, true, true))
            .collect();
        let report = score_summary("doc", &summary_with(sections));
        assert_eq!(report.completeness_score, 1.0);
    }

    #[test]
    fn missing_summary_degrades_with_error_marker() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocStore::new(dir.path());
        let report = compute_completeness("ghost", &store).unwrap();
        assert_eq!(report.completeness_score, 0.0);
        assert_eq!(report.error.as_deref(), Some("policy_summary_not_found"));
    }
}
