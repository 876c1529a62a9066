//! Grounded question answering over the active document

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::evaluation::{confidence_for_qa, validate_qa_response};
use crate::providers::llm::LlmProvider;
use crate::providers::vector_index::VectorIndexProvider;
use crate::terminology::TerminologyMap;
use crate::types::{AnswerType, QaResponse, NOT_FOUND_MESSAGE, QA_DISCLAIMER};

use super::citation::validate_citations;
use super::parser::{parse_llm_json, ParseOutcome, QaDraft};
use super::prompt::PromptBuilder;

/// Answers free-form questions with citations into the active document
///
/// This is the permissive consumption point for citations: an answer whose
/// citations all fail validation survives, but its classification is forced
/// away from "answerable" so it can never read as a grounded claim.
pub struct QaEngine {
    index: Arc<dyn VectorIndexProvider>,
    llm: Arc<dyn LlmProvider>,
    terminology: TerminologyMap,
    retrieval: RetrievalConfig,
}

impl QaEngine {
    pub fn new(
        index: Arc<dyn VectorIndexProvider>,
        llm: Arc<dyn LlmProvider>,
        terminology: TerminologyMap,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            index,
            llm,
            terminology,
            retrieval,
        }
    }

    pub async fn ask(&self, doc_id: &str, question: &str) -> Result<QaResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(QaResponse::not_found(doc_id, question, Vec::new()));
        }

        let hits = match self
            .index
            .query(doc_id, question, self.retrieval.qa_top_k)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "retrieval failed; answering not found");
                Vec::new()
            }
        };
        if hits.is_empty() {
            return Ok(QaResponse::not_found(doc_id, question, Vec::new()));
        }

        let allowed: HashSet<String> = hits.iter().map(|h| h.chunk_id.clone()).collect();
        let valid_pages: HashSet<u32> = hits.iter().map(|h| h.page_number).collect();
        let retrieval_strong = hits
            .iter()
            .filter_map(|h| h.distance)
            .any(|d| d < self.retrieval.strong_distance);

        let context = PromptBuilder::build_qa_context(&hits);
        let raw = match self
            .llm
            .generate_json(
                PromptBuilder::qa_system_prompt(),
                &PromptBuilder::qa_user_prompt(question, &context),
            )
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "generation failed; answering not found");
                return Ok(QaResponse::not_found(
                    doc_id,
                    question,
                    vec!["generation_failed".to_string()],
                ));
            }
        };

        let draft = match parse_llm_json::<QaDraft>(&raw) {
            ParseOutcome::Parsed(draft) => draft,
            ParseOutcome::Failure => {
                debug!("unparsable answer; answering not found");
                return Ok(QaResponse::not_found(
                    doc_id,
                    question,
                    vec!["unparsable_generation_output".to_string()],
                ));
            }
        };

        let filtered = validate_citations(&draft.citations, &allowed);

        let mut answer_type = draft
            .answer_type
            .as_deref()
            .map(AnswerType::parse)
            .unwrap_or(AnswerType::Answerable);
        // uncited claims may survive here, but never as "answerable"
        if filtered.kept.is_empty() && answer_type == AnswerType::Answerable {
            answer_type = AnswerType::NotFound;
        }

        let answer = {
            let trimmed = draft.answer.trim();
            if trimmed.is_empty() {
                NOT_FOUND_MESSAGE.to_string()
            } else {
                self.terminology.normalize(trimmed)
            }
        };

        let mut response = QaResponse {
            doc_id: doc_id.to_string(),
            question: question.to_string(),
            answer,
            answer_type,
            citations: filtered.kept,
            confidence: crate::types::ConfidenceLevel::Low,
            disclaimer: QA_DISCLAIMER.to_string(),
            validation_issues: filtered.issues,
        };

        response
            .validation_issues
            .extend(validate_qa_response(&response, &valid_pages));
        response.confidence = confidence_for_qa(
            response.answer_type,
            response.citations.len(),
            &response.validation_issues,
            hits.len(),
            retrieval_strong,
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::error::Error;
    use crate::providers::vector_index::IndexHit;
    use crate::types::{Chunk, ConfidenceLevel};

    struct FixedIndex {
        hits: Vec<IndexHit>,
    }

    #[async_trait]
    impl VectorIndexProvider for FixedIndex {
        async fn replace(&self, _doc_id: &str, _chunks: &[Chunk]) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _doc_id: &str, _text: &str, top_k: usize) -> Result<Vec<IndexHit>> {
            Ok(self.hits.iter().take(top_k).cloned().collect())
        }

        async fn len(&self) -> Result<usize> {
            Ok(self.hits.len())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct CannedLlm {
        responses: Mutex<Vec<Result<String>>>,
    }

    impl CannedLlm {
        fn ok(raw: &str) -> Self {
            Self {
                responses: Mutex::new(vec![Ok(raw.to_string())]),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        async fn generate_json(&self, _system: &str, _user: &str) -> Result<String> {
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                Err(Error::Llm("no scripted response".to_string()))
            } else {
                responses.remove(0)
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-1"
        }
    }

    fn hit(chunk_id: &str, page: u32, text: &str, distance: f32) -> IndexHit {
        IndexHit {
            chunk_id: chunk_id.to_string(),
            page_number: page,
            chunk_text: text.to_string(),
            distance: Some(distance),
        }
    }

    fn engine(hits: Vec<IndexHit>, llm: CannedLlm) -> QaEngine {
        QaEngine::new(
            Arc::new(FixedIndex { hits }),
            Arc::new(llm),
            TerminologyMap::empty(),
            RetrievalConfig::default(),
        )
    }

    #[tokio::test]
    async fn zero_hits_answer_not_found() {
        let engine = engine(Vec::new(), CannedLlm::ok("{}"));
        let response = engine.ask("doc", "What is the deductible?").await.unwrap();
        assert_eq!(response.answer_type, AnswerType::NotFound);
        assert_eq!(response.confidence, ConfidenceLevel::Low);
        assert_eq!(response.answer, NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn cited_answer_with_strong_retrieval_is_high() {
        let hits = vec![
            hit("c_1_0", 1, "The deductible is $500.", 0.1),
            hit("c_2_0", 2, "Coinsurance is 20%.", 0.2),
        ];
        let raw = r#"{"answer": "The deductible is $500 and coinsurance is 20%.",
                      "answer_type": "answerable",
                      "citations": [{"chunk_id": "c_1_0", "page": 1}, {"chunk_id": "c_2_0", "page": 2}]}"#;
        let response = engine(hits, CannedLlm::ok(raw))
            .ask("doc", "What do I pay?")
            .await
            .unwrap();

        assert_eq!(response.answer_type, AnswerType::Answerable);
        assert_eq!(response.citations.len(), 2);
        assert!(response.validation_issues.is_empty());
        assert_eq!(response.confidence, ConfidenceLevel::High);
    }

    #[tokio::test]
    async fn single_citation_with_weak_retrieval_is_medium() {
        let hits = vec![
            hit("c_1_0", 1, "The deductible is $500.", 0.8),
            hit("c_2_0", 2, "Coinsurance is 20%.", 0.9),
        ];
        let raw = r#"{"answer": "The deductible is $500.",
                      "answer_type": "answerable",
                      "citations": [{"chunk_id": "c_1_0", "page": 1}]}"#;
        let response = engine(hits, CannedLlm::ok(raw))
            .ask("doc", "What is the deductible?")
            .await
            .unwrap();
        assert_eq!(response.confidence, ConfidenceLevel::Medium);
    }

    #[tokio::test]
    async fn uncited_answer_is_forced_away_from_answerable() {
        let hits = vec![hit("c_1_0", 1, "The deductible is $500.", 0.1)];
        let raw = r#"{"answer": "Probably around $500.", "answer_type": "answerable", "citations": []}"#;
        let response = engine(hits, CannedLlm::ok(raw))
            .ask("doc", "What is the deductible?")
            .await
            .unwrap();
        assert_eq!(response.answer_type, AnswerType::NotFound);
        assert_eq!(response.confidence, ConfidenceLevel::Low);
        // the uncited claim itself survives for the caller to render
        assert_eq!(response.answer, "Probably around $500.");
    }

    #[tokio::test]
    async fn hallucinated_citation_is_dropped_and_recorded() {
        let hits = vec![hit("c_1_0", 1, "The deductible is $500.", 0.1)];
        let raw = r#"{"answer": "It is $500.", "answer_type": "answerable",
                      "citations": [{"chunk_id": "c_42_0", "page": 42}]}"#;
        let response = engine(hits, CannedLlm::ok(raw))
            .ask("doc", "What is the deductible?")
            .await
            .unwrap();

        assert!(response.citations.is_empty());
        assert_eq!(response.answer_type, AnswerType::NotFound);
        assert!(response
            .validation_issues
            .iter()
            .any(|i| i.contains("invalid_chunk_id:c_42_0")));
        assert_eq!(response.confidence, ConfidenceLevel::Low);
    }

    #[tokio::test]
    async fn unparsable_output_degrades_to_not_found() {
        let hits = vec![hit("c_1_0", 1, "The deductible is $500.", 0.1)];
        let response = engine(hits, CannedLlm::ok("no json here, sorry"))
            .ask("doc", "What is the deductible?")
            .await
            .unwrap();
        assert_eq!(response.answer_type, AnswerType::NotFound);
        assert_eq!(
            response.validation_issues,
            vec!["unparsable_generation_output"]
        );
    }

    #[tokio::test]
    async fn empty_question_short_circuits() {
        let engine = engine(vec![hit("c_1_0", 1, "text", 0.1)], CannedLlm::ok("{}"));
        let response = engine.ask("doc", "   ").await.unwrap();
        assert_eq!(response.answer_type, AnswerType::NotFound);
    }
}
