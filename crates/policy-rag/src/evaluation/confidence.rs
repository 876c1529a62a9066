//! Deterministic confidence decision tables
//!
//! Two pure functions, not a learned or numeric score. Every branch is
//! enumerable and tested exhaustively; given the same inputs they always
//! return the same label.

use crate::types::{AnswerType, Bullet, ConfidenceLevel};

/// Confidence for a question/answer unit
///
/// Rules, in order:
/// 1. anything other than an answerable classification is low
/// 2. zero citations, zero retrieved chunks, or any issue mentioning
///    "invalid" or "no_citations" is low
/// 3. any remaining issue caps at medium
/// 4. two or more citations with strong retrieval (or at least three
///    retrieved chunks) is high
/// 5. at least one citation is medium
/// 6. otherwise low
pub fn confidence_for_qa(
    answer_type: AnswerType,
    citation_count: usize,
    validation_issues: &[String],
    retrieval_chunk_count: usize,
    retrieval_strong: bool,
) -> ConfidenceLevel {
    if answer_type != AnswerType::Answerable {
        return ConfidenceLevel::Low;
    }
    if citation_count == 0
        || retrieval_chunk_count == 0
        || validation_issues
            .iter()
            .any(|i| i.contains("invalid") || i.contains("no_citations"))
    {
        return ConfidenceLevel::Low;
    }
    if !validation_issues.is_empty() {
        return ConfidenceLevel::Medium;
    }
    if citation_count >= 2 && (retrieval_strong || retrieval_chunk_count >= 3) {
        return ConfidenceLevel::High;
    }
    if citation_count >= 1 {
        return ConfidenceLevel::Medium;
    }
    ConfidenceLevel::Low
}

/// Confidence for a section summary
///
/// Rules, in order:
/// 1. absent, bullet-less, or backed by zero retrieved chunks is low
/// 2. any issue tagged "invalid" or "missing_citations" is low
/// 3. any other issue caps at medium
/// 4. every bullet cited and at least three retrieved chunks is high
/// 5. every bullet cited with weaker retrieval is medium
/// 6. otherwise low
pub fn confidence_for_section(
    present: bool,
    bullets: &[Bullet],
    validation_issues: &[String],
    retrieval_chunk_count: usize,
) -> ConfidenceLevel {
    if !present || bullets.is_empty() || retrieval_chunk_count == 0 {
        return ConfidenceLevel::Low;
    }
    if validation_issues
        .iter()
        .any(|i| i.contains("invalid") || i.contains("missing_citations"))
    {
        return ConfidenceLevel::Low;
    }
    if !validation_issues.is_empty() {
        return ConfidenceLevel::Medium;
    }

    let every_bullet_cited = bullets.iter().all(|b| !b.citations.is_empty());
    if every_bullet_cited && retrieval_chunk_count >= 3 {
        return ConfidenceLevel::High;
    }
    if every_bullet_cited {
        return ConfidenceLevel::Medium;
    }
    ConfidenceLevel::Low
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Citation;

    fn cited_bullet() -> Bullet {
        Bullet {
            text: "Deductible is $500.".to_string(),
            citations: vec![Citation {
                page: 1,
                chunk_id: "c_1_0".to_string(),
            }],
        }
    }

    fn uncited_bullet() -> Bullet {
        Bullet {
            text: "No source.".to_string(),
            citations: Vec::new(),
        }
    }

    fn no_issues() -> Vec<String> {
        Vec::new()
    }

    // --- QA table, branch by branch ---

    #[test]
    fn qa_rule1_non_answerable_is_low() {
        for answer_type in [
            AnswerType::NotFound,
            AnswerType::Ambiguous,
            AnswerType::Conflict,
            AnswerType::SectionDetail,
        ] {
            assert_eq!(
                confidence_for_qa(answer_type, 5, &no_issues(), 5, true),
                ConfidenceLevel::Low
            );
        }
    }

    #[test]
    fn qa_rule2_zero_citations_is_low() {
        assert_eq!(
            confidence_for_qa(AnswerType::Answerable, 0, &no_issues(), 5, true),
            ConfidenceLevel::Low
        );
    }

    #[test]
    fn qa_rule2_zero_retrieved_chunks_is_low() {
        assert_eq!(
            confidence_for_qa(AnswerType::Answerable, 3, &no_issues(), 0, true),
            ConfidenceLevel::Low
        );
    }

    #[test]
    fn qa_rule2_invalid_or_no_citation_issues_are_low() {
        let invalid = vec!["invalid_page_citation:99".to_string()];
        assert_eq!(
            confidence_for_qa(AnswerType::Answerable, 3, &invalid, 5, true),
            ConfidenceLevel::Low
        );
        let uncited = vec!["answerable_but_no_citations".to_string()];
        assert_eq!(
            confidence_for_qa(AnswerType::Answerable, 3, &uncited, 5, true),
            ConfidenceLevel::Low
        );
    }

    #[test]
    fn qa_rule3_other_issues_cap_at_medium() {
        let issues = vec!["sentence_count_exceeds_6".to_string()];
        assert_eq!(
            confidence_for_qa(AnswerType::Answerable, 3, &issues, 5, true),
            ConfidenceLevel::Medium
        );
    }

    #[test]
    fn qa_rule4_two_citations_with_strong_retrieval_is_high() {
        assert_eq!(
            confidence_for_qa(AnswerType::Answerable, 2, &no_issues(), 1, true),
            ConfidenceLevel::High
        );
        assert_eq!(
            confidence_for_qa(AnswerType::Answerable, 2, &no_issues(), 3, false),
            ConfidenceLevel::High
        );
    }

    #[test]
    fn qa_rule5_single_citation_is_medium() {
        assert_eq!(
            confidence_for_qa(AnswerType::Answerable, 1, &no_issues(), 5, true),
            ConfidenceLevel::Medium
        );
        // two citations but weak retrieval also lands here
        assert_eq!(
            confidence_for_qa(AnswerType::Answerable, 2, &no_issues(), 2, false),
            ConfidenceLevel::Medium
        );
    }

    // --- Section table, branch by branch ---

    #[test]
    fn section_rule1_absent_or_empty_is_low() {
        assert_eq!(
            confidence_for_section(false, &[], &no_issues(), 5),
            ConfidenceLevel::Low
        );
        assert_eq!(
            confidence_for_section(true, &[], &no_issues(), 5),
            ConfidenceLevel::Low
        );
    }

    #[test]
    fn section_rule1_zero_retrieval_is_low_independent_of_everything_else() {
        assert_eq!(
            confidence_for_section(true, &[cited_bullet(), cited_bullet()], &no_issues(), 0),
            ConfidenceLevel::Low
        );
    }

    #[test]
    fn section_rule2_invalid_or_missing_citation_issues_are_low() {
        let invalid = vec!["bullet_1_invalid_chunk_id:x_0_0".to_string()];
        assert_eq!(
            confidence_for_section(true, &[cited_bullet()], &invalid, 5),
            ConfidenceLevel::Low
        );
        let missing = vec!["bullet_2_missing_citations".to_string()];
        assert_eq!(
            confidence_for_section(true, &[cited_bullet()], &missing, 5),
            ConfidenceLevel::Low
        );
    }

    #[test]
    fn section_rule3_other_issues_cap_at_medium() {
        let issues = vec!["bullet_count_below_3".to_string()];
        assert_eq!(
            confidence_for_section(true, &[cited_bullet()], &issues, 5),
            ConfidenceLevel::Medium
        );
    }

    #[test]
    fn section_rule4_fully_cited_with_strong_retrieval_is_high() {
        assert_eq!(
            confidence_for_section(true, &[cited_bullet(), cited_bullet()], &no_issues(), 3),
            ConfidenceLevel::High
        );
    }

    #[test]
    fn section_rule5_fully_cited_with_weak_retrieval_is_medium() {
        assert_eq!(
            confidence_for_section(true, &[cited_bullet()], &no_issues(), 2),
            ConfidenceLevel::Medium
        );
    }

    #[test]
    fn section_rule6_uncited_bullet_without_issue_strings_is_low() {
        assert_eq!(
            confidence_for_section(true, &[cited_bullet(), uncited_bullet()], &no_issues(), 5),
            ConfidenceLevel::Low
        );
    }
}
