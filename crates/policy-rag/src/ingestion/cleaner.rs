//! Header/footer cleanup for extracted pages
//!
//! Runs once over the whole page set before chunking; removing lines changes
//! sentence boundaries, so this must never run after chunks are cut.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::ExtractedPage;

static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static PAGE_N_OF_M: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^page\s+\d+\s+of\s+\d+$").expect("valid regex"));
static PAGE_FRACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s*/\s*\d+$").expect("valid regex"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Lines shorter than this at a page edge are treated as junk
const MIN_EDGE_LINE_CHARS: usize = 3;

/// Collapse runs of whitespace and trim
pub fn normalize_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Detect page markers like "1", "Page 1 of 10", or "5/12"
pub fn looks_like_page_marker(line: &str) -> bool {
    let line = normalize_line(line);
    line.is_empty()
        || BARE_NUMBER.is_match(&line)
        || PAGE_N_OF_M.is_match(&line)
        || PAGE_FRACTION.is_match(&line)
}

/// Strip junk lines from the top and bottom of a page
fn clean_page_text(lines: &[String]) -> String {
    let mut start = 0;
    let mut end = lines.len();

    while start < end {
        let line = lines[start].trim();
        if looks_like_page_marker(line) || line.len() < MIN_EDGE_LINE_CHARS {
            start += 1;
        } else {
            break;
        }
    }
    while end > start {
        let line = lines[end - 1].trim();
        if looks_like_page_marker(line) || line.len() < MIN_EDGE_LINE_CHARS {
            end -= 1;
        } else {
            break;
        }
    }

    let text = lines[start..end]
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_RUNS.replace_all(&text, "\n\n").trim().to_string()
}

/// Drop lines that repeat across more than half the pages
///
/// A line appearing on most pages is almost certainly a running header or
/// footer and would clutter retrieval if indexed.
fn remove_repeated_lines(lines_by_page: Vec<Vec<String>>) -> Vec<Vec<String>> {
    if lines_by_page.len() < 2 {
        return lines_by_page;
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for page_lines in &lines_by_page {
        for line in page_lines {
            let normalized = normalize_line(line);
            if normalized.len() > 2 {
                *counts.entry(normalized).or_insert(0) += 1;
            }
        }
    }

    let threshold = std::cmp::max(2, lines_by_page.len() / 2);
    lines_by_page
        .into_iter()
        .map(|page_lines| {
            page_lines
                .into_iter()
                .filter(|line| {
                    counts
                        .get(&normalize_line(line))
                        .map_or(true, |&count| count <= threshold)
                })
                .collect()
        })
        .collect()
}

/// Full cleanup pass: statistical header/footer removal, then per-page edge
/// stripping. Page numbers are preserved even when a page ends up empty.
pub fn clean_pages(pages: Vec<ExtractedPage>) -> Vec<ExtractedPage> {
    let lines_by_page: Vec<Vec<String>> = pages
        .iter()
        .map(|p| p.text.lines().map(|l| l.trim().to_string()).collect())
        .collect();

    let cleaned = remove_repeated_lines(lines_by_page);

    pages
        .iter()
        .zip(cleaned)
        .map(|(page, lines)| ExtractedPage::new(page.page_number, clean_page_text(&lines)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_page_markers() {
        assert!(looks_like_page_marker("7"));
        assert!(looks_like_page_marker("Page 3 of 12"));
        assert!(looks_like_page_marker("page 3 OF 12"));
        assert!(looks_like_page_marker("5 / 12"));
        assert!(looks_like_page_marker("   "));
        assert!(!looks_like_page_marker("Deductible: $500"));
    }

    #[test]
    fn strips_markers_from_page_edges() {
        let pages = vec![ExtractedPage::new(
            1,
            "Page 1 of 2\nThe deductible is $500 per year.\n1",
        )];
        let cleaned = clean_pages(pages);
        assert_eq!(cleaned[0].text, "The deductible is $500 per year.");
    }

    #[test]
    fn removes_repeated_header_from_every_page() {
        let header = "Acme Health Insurance Co.";
        let pages: Vec<ExtractedPage> = (1..=4)
            .map(|n| {
                ExtractedPage::new(n, format!("{header}\nUnique content for page {n} goes here."))
            })
            .collect();

        let cleaned = clean_pages(pages);
        for page in &cleaned {
            assert!(!page.text.contains(header), "header survived on page {}", page.page_number);
            assert!(page.text.contains("Unique content"));
        }
    }

    #[test]
    fn single_page_skips_frequency_pass() {
        let pages = vec![ExtractedPage::new(1, "Acme Health\nThe copay is $20 per visit.")];
        let cleaned = clean_pages(pages);
        assert!(cleaned[0].text.contains("Acme Health"));
    }

    #[test]
    fn empty_page_stays_addressable() {
        let pages = vec![ExtractedPage::new(1, ""), ExtractedPage::new(2, "Real content lives here.")];
        let cleaned = clean_pages(pages);
        assert_eq!(cleaned[0].page_number, 1);
        assert_eq!(cleaned[0].text, "");
        assert_eq!(cleaned[1].page_number, 2);
    }

    #[test]
    fn collapses_blank_runs() {
        let pages = vec![ExtractedPage::new(
            1,
            "First paragraph is here.\n\n\n\nSecond paragraph is here.",
        )];
        let cleaned = clean_pages(pages);
        assert_eq!(cleaned[0].text, "First paragraph is here.\n\nSecond paragraph is here.");
    }
}
