//! Tolerant JSON extraction from generated text

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("valid regex"));

/// Outcome of parsing generated text as typed JSON
///
/// Malformed output is a first-class state the caller maps to a "not found"
/// result; it never propagates as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Failure,
}

impl<T> ParseOutcome<T> {
    pub fn parsed(self) -> Option<T> {
        match self {
            ParseOutcome::Parsed(value) => Some(value),
            ParseOutcome::Failure => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ParseOutcome::Failure)
    }
}

/// Locate the JSON object inside raw model output
///
/// Handles markdown fences and conversational filler around the object.
fn extract_json_object(raw: &str) -> Option<&str> {
    let s = raw.trim();
    if let Some(caps) = FENCED_JSON.captures(s) {
        return caps.get(1).map(|m| m.as_str());
    }
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

/// Parse generated text into a typed draft
pub fn parse_llm_json<T: DeserializeOwned>(raw: &str) -> ParseOutcome<T> {
    let Some(body) = extract_json_object(raw) else {
        debug!("no JSON object in generated output");
        return ParseOutcome::Failure;
    };
    match serde_json::from_str(body) {
        Ok(value) => ParseOutcome::Parsed(value),
        Err(e) => {
            debug!(error = %e, "generated output failed to parse");
            ParseOutcome::Failure
        }
    }
}

/// Citation exactly as the generator emitted it; untrusted until validated.
/// `page` is signed because a hallucinating model can emit anything.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DraftCitation {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub chunk_id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DraftBullet {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub citations: Vec<DraftCitation>,
}

/// Raw section summary draft from the generator
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SectionDraft {
    #[serde(default)]
    pub present: bool,
    #[serde(default)]
    pub bullets: Vec<DraftBullet>,
}

/// Raw Q&A draft from the generator
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct QaDraft {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub answer_type: Option<String>,
    #[serde(default)]
    pub citations: Vec<DraftCitation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let outcome: ParseOutcome<SectionDraft> = parse_llm_json(
            r#"{"present": true, "bullets": [{"text": "Deductible is $500.", "citations": [{"chunk_id": "c_1_0", "page": 1}]}]}"#,
        );
        let draft = outcome.parsed().unwrap();
        assert!(draft.present);
        assert_eq!(draft.bullets.len(), 1);
        assert_eq!(draft.bullets[0].citations[0].chunk_id, "c_1_0");
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "Sure, here you go:\n```json\n{\"present\": false, \"bullets\": []}\n```\nHope that helps!";
        let outcome: ParseOutcome<SectionDraft> = parse_llm_json(raw);
        let draft = outcome.parsed().unwrap();
        assert!(!draft.present);
    }

    #[test]
    fn parses_json_with_surrounding_filler() {
        let raw = "The answer follows. {\"answer\": \"$500\", \"answer_type\": \"answerable\", \"citations\": []} Done.";
        let outcome: ParseOutcome<QaDraft> = parse_llm_json(raw);
        let draft = outcome.parsed().unwrap();
        assert_eq!(draft.answer, "$500");
        assert_eq!(draft.answer_type.as_deref(), Some("answerable"));
    }

    #[test]
    fn garbage_is_a_failure_not_an_error() {
        let outcome: ParseOutcome<SectionDraft> = parse_llm_json("I could not find anything relevant.");
        assert!(outcome.is_failure());

        let outcome: ParseOutcome<SectionDraft> = parse_llm_json("{not json at all");
        assert!(outcome.is_failure());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let outcome: ParseOutcome<QaDraft> = parse_llm_json(r#"{"answer": "Yes."}"#);
        let draft = outcome.parsed().unwrap();
        assert!(draft.answer_type.is_none());
        assert!(draft.citations.is_empty());
    }
}
