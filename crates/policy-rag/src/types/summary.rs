//! Summary types: sections, bullets, citations, confidence

use std::fmt;

use serde::{Deserialize, Serialize};

use super::document::DocMetadata;

/// Shown in place of content when a section or answer has no support
pub const NOT_FOUND_MESSAGE: &str = "Not found in this document.";

/// Disclaimer attached to every generated summary
pub const DEFAULT_DISCLAIMER: &str =
    "This summary is for informational purposes only. It does not replace the full policy document.";

/// The closed set of canonical policy sections
///
/// Retrieval and validation reject any other value by returning an empty
/// result rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionName {
    #[serde(rename = "Plan Snapshot")]
    PlanSnapshot,
    #[serde(rename = "Cost Summary")]
    CostSummary,
    #[serde(rename = "Summary of Covered Services")]
    CoveredServices,
    #[serde(rename = "Administrative Conditions")]
    AdministrativeConditions,
    #[serde(rename = "Exclusions & Limitations")]
    ExclusionsLimitations,
    #[serde(rename = "Claims, Appeals & Member Rights")]
    ClaimsAppealsRights,
}

impl SectionName {
    /// All canonical sections, in presentation order
    pub const ALL: [SectionName; 6] = [
        SectionName::PlanSnapshot,
        SectionName::CostSummary,
        SectionName::CoveredServices,
        SectionName::AdministrativeConditions,
        SectionName::ExclusionsLimitations,
        SectionName::ClaimsAppealsRights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::PlanSnapshot => "Plan Snapshot",
            SectionName::CostSummary => "Cost Summary",
            SectionName::CoveredServices => "Summary of Covered Services",
            SectionName::AdministrativeConditions => "Administrative Conditions",
            SectionName::ExclusionsLimitations => "Exclusions & Limitations",
            SectionName::ClaimsAppealsRights => "Claims, Appeals & Member Rights",
        }
    }

    /// Exact match against the canonical display names
    pub fn parse(name: &str) -> Option<Self> {
        SectionName::ALL.iter().copied().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic, rule-based trust label. Not a probabilistic score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// The evidence for a claim: a page plus the exact chunk it came from
///
/// Validity is re-checked at every consumption point, never trusted from a
/// prior stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based page number
    pub page: u32,
    /// Chunk ID of the form `c_{page}_{index}`
    pub chunk_id: String,
}

/// A single summary point. Every claim carries its own source citations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// How many bullets a section summary may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Standard,
    Detailed,
}

impl DetailLevel {
    /// Inclusive (min, max) bullet counts enforced by validation
    pub fn bullet_bounds(&self) -> (usize, usize) {
        match self {
            DetailLevel::Standard => (3, 6),
            DetailLevel::Detailed => (6, 12),
        }
    }

    /// Hard cap applied when assembling a summary
    pub fn bullet_cap(&self) -> usize {
        self.bullet_bounds().1
    }
}

/// Summary of one canonical section
///
/// `present == false` means the generator correctly declared the section
/// missing; `bullets` is empty in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub section_name: SectionName,
    pub present: bool,
    #[serde(default)]
    pub bullets: Vec<Bullet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_found_message: Option<String>,
    pub confidence: ConfidenceLevel,
    #[serde(default)]
    pub validation_issues: Vec<String>,
}

impl SectionSummary {
    /// The deterministic degraded state for a section with no usable support
    pub fn not_found(section_name: SectionName, issues: Vec<String>) -> Self {
        Self {
            section_name,
            present: false,
            bullets: Vec::new(),
            not_found_message: Some(NOT_FOUND_MESSAGE.to_string()),
            confidence: ConfidenceLevel::Low,
            validation_issues: issues,
        }
    }
}

/// The persisted output of a full summary run
///
/// Re-running the pipeline produces a new object, never an in-place update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySummary {
    pub metadata: DocMetadata,
    pub disclaimer: String,
    pub sections: Vec<SectionSummary>,
}
