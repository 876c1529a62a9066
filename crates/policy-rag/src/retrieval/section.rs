//! Multi-query retrieval for canonical policy sections

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::providers::vector_index::VectorIndexProvider;
use crate::types::{Chunk, RetrievedChunk, SectionName};

/// Ordered sub-queries per canonical section
///
/// Insurance documents use inconsistent terminology for the same concept, so
/// each section fans out to several lexically diverse queries to protect
/// recall.
pub fn section_queries(section: SectionName) -> &'static [&'static str] {
    match section {
        SectionName::PlanSnapshot => &[
            "plan name and type",
            "summary of benefits overview",
            "plan overview and key features",
        ],
        SectionName::CostSummary => &[
            "deductible amount and when it applies",
            "copay and coinsurance",
            "out of pocket maximum OOP",
            "annual deductible",
            "cost sharing requirements",
        ],
        SectionName::CoveredServices => &[
            "what is covered",
            "covered benefits and services",
            "coverage details",
            "covered medical services",
            "benefits included in plan",
        ],
        SectionName::AdministrativeConditions => &[
            "prior authorization",
            "referrals required",
            "administrative requirements",
        ],
        SectionName::ExclusionsLimitations => &[
            "exclusions not covered",
            "limitations and restrictions",
            "what is not covered",
        ],
        SectionName::ClaimsAppealsRights => &[
            "how to file a claim",
            "appeals and grievances",
            "member rights and responsibilities",
        ],
    }
}

/// Gathers the chunks relevant to each canonical section
pub struct SectionRetriever {
    index: Arc<dyn VectorIndexProvider>,
}

impl SectionRetriever {
    pub fn new(index: Arc<dyn VectorIndexProvider>) -> Self {
        Self { index }
    }

    /// Retrieve chunks for one canonical section
    ///
    /// Results from all sub-queries merge by chunk_id keeping the smallest
    /// reported distance, then sort by (page_number, chunk_id) so downstream
    /// prompts read the document in its written order, then cap at
    /// `max_chunks`. An unknown section name yields an empty result rather
    /// than an error.
    pub async fn retrieve_for_section(
        &self,
        doc_id: &str,
        section_name: &str,
        top_k_per_query: usize,
        max_chunks: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let Some(section) = SectionName::parse(section_name) else {
            debug!(section = section_name, "unknown section requested");
            return Ok(Vec::new());
        };

        let mut seen: HashMap<String, RetrievedChunk> = HashMap::new();

        for query in section_queries(section) {
            let hits = match self.index.query(doc_id, query, top_k_per_query).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(query, error = %e, "sub-query failed; continuing with the rest");
                    continue;
                }
            };

            for hit in hits {
                if hit.chunk_id.is_empty() {
                    continue;
                }

                let replace = match seen.get(&hit.chunk_id) {
                    None => true,
                    // closer match wins; on ties or missing distances the
                    // first occurrence stays
                    Some(kept) => matches!(
                        (hit.distance, kept.distance),
                        (Some(new), Some(old)) if new < old
                    ),
                };
                if replace {
                    seen.insert(
                        hit.chunk_id.clone(),
                        RetrievedChunk {
                            chunk: Chunk {
                                chunk_id: hit.chunk_id,
                                page_number: hit.page_number,
                                doc_id: doc_id.to_string(),
                                chunk_text: hit.chunk_text,
                            },
                            distance: hit.distance,
                            section: section.as_str().to_string(),
                        },
                    );
                }
            }
        }

        let mut ordered: Vec<RetrievedChunk> = seen.into_values().collect();
        ordered.sort_by(|a, b| {
            (a.chunk.page_number, a.chunk.chunk_id.as_str())
                .cmp(&(b.chunk.page_number, b.chunk.chunk_id.as_str()))
        });
        ordered.truncate(max_chunks);
        Ok(ordered)
    }
}
