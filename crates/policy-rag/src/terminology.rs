//! Terminology normalization: replace insurer jargon with canonical terms

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static DOUBLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*""#).expect("valid regex"));
static SINGLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"'[^']*'").expect("valid regex"));

const QUOTE_PLACEHOLDER: &str = "\u{0}QUOTE\u{0}";

/// Canonical-term map applied to generated text
///
/// Replacements are whole-phrase and case-insensitive; quoted spans are left
/// untouched so verbatim policy language survives normalization. Longer
/// synonyms are applied first so "annual deductible" wins over "deductible".
#[derive(Debug, Default)]
pub struct TerminologyMap {
    /// Compiled synonym pattern paired with its canonical replacement
    rules: Vec<(Regex, String)>,
}

impl TerminologyMap {
    /// A map that leaves text unchanged
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from canonical -> synonyms pairs
    pub fn from_map(map: HashMap<String, Vec<String>>) -> Self {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (canonical, synonyms) in map {
            for synonym in synonyms {
                let synonym = synonym.trim().to_string();
                if !synonym.is_empty() {
                    pairs.push((synonym, canonical.clone()));
                }
            }
        }
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let rules = pairs
            .into_iter()
            .filter_map(|(synonym, canonical)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(&synonym));
                Regex::new(&pattern).ok().map(|re| (re, canonical))
            })
            .collect();

        Self { rules }
    }

    /// Load from a JSON file of canonical -> synonyms. Missing or invalid
    /// files yield an empty map; normalization is best-effort.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::empty();
        }
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "terminology map unreadable");
                return Self::empty();
            }
        };
        match serde_json::from_str::<HashMap<String, Vec<String>>>(&raw) {
            Ok(map) => Self::from_map(map),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "terminology map invalid");
                Self::empty()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Replace synonym phrases with canonical terms
    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() || self.rules.is_empty() {
            return text.to_string();
        }

        let (mut work, quoted) = extract_quoted(text);
        for (pattern, canonical) in &self.rules {
            // NoExpand: canonical terms are literal text, never group references
            work = pattern
                .replace_all(&work, regex::NoExpand(canonical))
                .into_owned();
        }
        restore_quoted(work, &quoted)
    }
}

fn extract_quoted(text: &str) -> (String, Vec<String>) {
    let mut quoted = Vec::new();
    let mut work = text.to_string();
    for pattern in [&*DOUBLE_QUOTED, &*SINGLE_QUOTED] {
        work = pattern
            .replace_all(&work, |caps: &regex::Captures| {
                quoted.push(caps[0].to_string());
                format!("{}{}{}", QUOTE_PLACEHOLDER, quoted.len() - 1, QUOTE_PLACEHOLDER)
            })
            .into_owned();
    }
    (work, quoted)
}

fn restore_quoted(mut text: String, quoted: &[String]) -> String {
    for (i, span) in quoted.iter().enumerate() {
        let placeholder = format!("{QUOTE_PLACEHOLDER}{i}{QUOTE_PLACEHOLDER}");
        text = text.replace(&placeholder, span);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> TerminologyMap {
        let mut raw = HashMap::new();
        raw.insert(
            "out-of-pocket maximum".to_string(),
            vec!["OOP max".to_string(), "out of pocket limit".to_string()],
        );
        raw.insert("copayment".to_string(), vec!["copay".to_string()]);
        TerminologyMap::from_map(raw)
    }

    #[test]
    fn replaces_whole_phrases_case_insensitively() {
        let normalized = map().normalize("Your Copay is $20 up to the OOP max.");
        assert_eq!(normalized, "Your copayment is $20 up to the out-of-pocket maximum.");
    }

    #[test]
    fn respects_word_boundaries() {
        let normalized = map().normalize("The copayments column lists copay amounts.");
        // "copayments" is a different word; only the standalone synonym changes
        assert_eq!(normalized, "The copayments column lists copayment amounts.");
    }

    #[test]
    fn leaves_quoted_spans_untouched() {
        let normalized = map().normalize(r#"The policy says "copay applies" for each copay."#);
        assert_eq!(normalized, r#"The policy says "copay applies" for each copayment."#);
    }

    #[test]
    fn empty_map_is_identity() {
        assert_eq!(TerminologyMap::empty().normalize("copay"), "copay");
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let map = TerminologyMap::load(Path::new("/nonexistent/terminology.json"));
        assert!(map.is_empty());
    }
}
