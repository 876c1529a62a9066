//! Section summarization and the full six-section pipeline

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::evaluation::{confidence_for_section, validate_section_summary};
use crate::providers::llm::LlmProvider;
use crate::retrieval::SectionRetriever;
use crate::storage::DocStore;
use crate::terminology::TerminologyMap;
use crate::types::{
    Bullet, DetailLevel, DocMetadata, PolicySummary, RetrievedChunk, SectionName, SectionSummary,
    DEFAULT_DISCLAIMER, NOT_FOUND_MESSAGE,
};

use super::citation::{allowed_ids, validate_citations};
use super::parser::{parse_llm_json, ParseOutcome, SectionDraft};
use super::prompt::PromptBuilder;

/// Turns retrieved chunks into a cited section summary
///
/// Every failure mode along the way (no chunks, generation error, malformed
/// output) degrades to a deterministic not-found summary; this method never
/// errors.
pub struct Summarizer {
    llm: Arc<dyn LlmProvider>,
    terminology: TerminologyMap,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmProvider>, terminology: TerminologyMap) -> Self {
        Self { llm, terminology }
    }

    pub async fn summarize_section(
        &self,
        section: SectionName,
        chunks: &[RetrievedChunk],
        detail: DetailLevel,
    ) -> SectionSummary {
        if chunks.is_empty() {
            return SectionSummary::not_found(
                section,
                vec!["No relevant document chunks found.".to_string()],
            );
        }

        let allowed = allowed_ids(chunks);
        let context = PromptBuilder::build_context(chunks);

        let raw = match self
            .llm
            .generate_json(
                PromptBuilder::section_system_prompt(),
                &PromptBuilder::section_user_prompt(section, &context),
            )
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(section = %section, error = %e, "generation failed");
                return SectionSummary::not_found(section, vec!["generation_failed".to_string()]);
            }
        };

        let draft = match parse_llm_json::<SectionDraft>(&raw) {
            ParseOutcome::Parsed(draft) => draft,
            ParseOutcome::Failure => {
                warn!(section = %section, "generation output was not valid JSON");
                return SectionSummary::not_found(
                    section,
                    vec!["unparsable_generation_output".to_string()],
                );
            }
        };

        if !draft.present {
            return SectionSummary::not_found(section, Vec::new());
        }

        // Strict context: a bullet whose citations all fail validation is
        // discarded whole. Dropped citations stay on the record and pull
        // confidence down.
        let mut bullets = Vec::new();
        let mut issues = Vec::new();
        for draft_bullet in draft.bullets {
            let filtered = validate_citations(&draft_bullet.citations, &allowed);
            issues.extend(filtered.issues);
            if filtered.kept.is_empty() {
                continue;
            }
            bullets.push(Bullet {
                text: self.terminology.normalize(draft_bullet.text.trim()),
                citations: filtered.kept,
            });
        }
        bullets.truncate(detail.bullet_cap());

        let present = !bullets.is_empty();
        let mut summary = SectionSummary {
            section_name: section,
            present,
            not_found_message: (!present).then(|| NOT_FOUND_MESSAGE.to_string()),
            bullets,
            confidence: crate::types::ConfidenceLevel::Low,
            validation_issues: issues,
        };

        summary
            .validation_issues
            .extend(validate_section_summary(&summary, detail));
        summary.confidence = confidence_for_section(
            summary.present,
            &summary.bullets,
            &summary.validation_issues,
            chunks.len(),
        );
        summary
    }
}

/// Orchestrates retrieval + summarization for all six canonical sections and
/// persists the result
pub struct SummaryPipeline {
    retriever: SectionRetriever,
    summarizer: Summarizer,
    store: DocStore,
    retrieval: RetrievalConfig,
}

impl SummaryPipeline {
    pub fn new(
        retriever: SectionRetriever,
        summarizer: Summarizer,
        store: DocStore,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            retriever,
            summarizer,
            store,
            retrieval,
        }
    }

    /// Run the full pipeline for one document
    ///
    /// Per-section degradation is local; only structural failures (store
    /// reads/writes) propagate. Each run persists a fresh summary object.
    pub async fn run(&self, doc_id: &str, detail: DetailLevel) -> Result<PolicySummary> {
        let total_pages = self.store.load_extracted_pages(doc_id)?.len() as u32;

        let mut sections = Vec::with_capacity(SectionName::ALL.len());
        for section in SectionName::ALL {
            let chunks = self
                .retriever
                .retrieve_for_section(
                    doc_id,
                    section.as_str(),
                    self.retrieval.top_k_per_query,
                    self.retrieval.max_chunks_per_section,
                )
                .await?;
            let summary = self.summarizer.summarize_section(section, &chunks, detail).await;
            sections.push(summary);
        }

        let summary = PolicySummary {
            metadata: DocMetadata {
                doc_id: doc_id.to_string(),
                generated_at: chrono::Utc::now(),
                total_pages,
                source_file: None,
            },
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
            sections,
        };

        self.store.save_summary(doc_id, &summary)?;
        info!(doc_id, sections = summary.sections.len(), "policy summary persisted");
        Ok(summary)
    }
}
