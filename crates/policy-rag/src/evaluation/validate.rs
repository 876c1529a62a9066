//! Validation issue vocabulary for summaries and answers
//!
//! Issue strings feed the confidence decision tables, which test them by
//! substring ("invalid", "missing_citations", "no_citations"); the exact
//! wording here is load-bearing.

use std::collections::HashSet;

use crate::types::{AnswerType, DetailLevel, QaResponse, SectionSummary, NOT_FOUND_MESSAGE};

use super::count_sentences;

/// Maximum sentences an answer may carry before it reads as a wall of text
const QA_SENTENCE_CAP: usize = 6;

/// Check a section summary for citation errors and bullet-count violations
pub fn validate_section_summary(section: &SectionSummary, detail: DetailLevel) -> Vec<String> {
    // a correctly-declared absent section has nothing to validate
    if !section.present {
        return Vec::new();
    }

    let mut issues = Vec::new();
    let (min_bullets, max_bullets) = detail.bullet_bounds();
    let count = section.bullets.len();

    if count > max_bullets {
        issues.push(format!("bullet_count_exceeds_{max_bullets}"));
    }
    if count > 0 && count < min_bullets {
        issues.push(format!("bullet_count_below_{min_bullets}"));
    }

    for (i, bullet) in section.bullets.iter().enumerate() {
        if bullet.citations.is_empty() {
            issues.push(format!("bullet_{}_missing_citations", i + 1));
        }
        for citation in &bullet.citations {
            if citation.page < 1 {
                issues.push(format!("bullet_{}_invalid_page:{}", i + 1, citation.page));
            }
            if !citation.chunk_id.starts_with("c_") {
                issues.push(format!(
                    "bullet_{}_invalid_chunk_id:{}",
                    i + 1,
                    citation.chunk_id
                ));
            }
        }
    }

    issues
}

/// Check a Q&A response for disclaimer presence and citation plausibility
pub fn validate_qa_response(response: &QaResponse, valid_pages: &HashSet<u32>) -> Vec<String> {
    let mut issues = Vec::new();

    if response.disclaimer.trim().is_empty() {
        issues.push("disclaimer_required".to_string());
    }

    match response.answer_type {
        AnswerType::NotFound | AnswerType::Ambiguous => issues,
        AnswerType::Conflict | AnswerType::SectionDetail => {
            push_page_issues(&mut issues, response, valid_pages);
            issues
        }
        AnswerType::Answerable => {
            if answer_has_factual_content(&response.answer) && response.citations.is_empty() {
                issues.push("answerable_but_no_citations".to_string());
            }
            if count_sentences(&response.answer) > QA_SENTENCE_CAP {
                issues.push(format!("sentence_count_exceeds_{QA_SENTENCE_CAP}"));
            }
            push_page_issues(&mut issues, response, valid_pages);
            issues
        }
    }
}

fn push_page_issues(issues: &mut Vec<String>, response: &QaResponse, valid_pages: &HashSet<u32>) {
    if valid_pages.is_empty() {
        return;
    }
    for citation in &response.citations {
        if !valid_pages.contains(&citation.page) {
            issues.push(format!("invalid_page_citation:{}", citation.page));
        }
    }
}

fn answer_has_factual_content(answer: &str) -> bool {
    let lowered = answer.trim().to_lowercase();
    !lowered.is_empty() && !lowered.contains(&NOT_FOUND_MESSAGE.to_lowercase())
}
