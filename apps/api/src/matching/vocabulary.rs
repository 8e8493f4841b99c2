//! Match vocabulary — the stop words and regex patterns the ATS engine runs on.
//!
//! Built once at startup and shared through `AppState`. Every scorer takes a
//! `&MatchVocabulary` instead of reaching for module globals, so tests can swap in
//! a different vocabulary.

use std::collections::HashSet;

use regex::Regex;

/// Words never treated as keywords on their own.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "etc", "experience", "for",
    "from", "has", "have", "in", "including", "is", "must", "of", "on", "or", "our",
    "plus", "should", "strong", "team", "that", "the", "this", "to", "we", "who", "will",
    "with", "work", "year", "years", "you", "your",
];

/// Tenure patterns in precedence order. Each captures the required years in group 1.
/// The range pattern deliberately captures the lower bound.
pub const DEFAULT_TENURE_PATTERNS: &[&str] = &[
    r"(?i)\b(?:minimum|at least|min\.?)\s*(\d+)\+?\s*(?:years?|yrs?)",
    r"(?i)\b(\d+)\+\s*(?:years?|yrs?)",
    r"(?i)\b(\d+)\s*[-–]\s*\d+\s*(?:years?|yrs?)",
    r"(?i)\b(\d+)\s*(?:years?|yrs?)\s*(?:experience|of experience)",
];

pub const DEFAULT_RELOCATION_PATTERN: &str =
    r"(?i)relocat|willing to move|open to (?:relocation|relocate)";

const QUOTED_PHRASE_PATTERN: &str = r#"["“]([^"“”\n]+)["”]"#;
const BULLET_PREFIX_PATTERN: &str = r"^\s*(?:[-*•·▪◦●]+|\d+[.)])\s*";

#[derive(Debug, Clone)]
pub struct MatchVocabulary {
    stop_words: HashSet<String>,
    tenure_patterns: Vec<Regex>,
    relocation: Regex,
    quoted_phrase: Regex,
    bullet_prefix: Regex,
}

impl MatchVocabulary {
    pub fn new(
        stop_words: &[&str],
        tenure_patterns: &[&str],
        relocation_pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            stop_words: stop_words.iter().map(|w| w.to_lowercase()).collect(),
            tenure_patterns: tenure_patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<_, _>>()?,
            relocation: Regex::new(relocation_pattern)?,
            quoted_phrase: Regex::new(QUOTED_PHRASE_PATTERN)?,
            bullet_prefix: Regex::new(BULLET_PREFIX_PATTERN)?,
        })
    }

    /// Replaces the stop-word list, keeping every pattern.
    #[cfg(test)]
    pub fn with_stop_words(mut self, stop_words: &[&str]) -> Self {
        self.stop_words = stop_words.iter().map(|w| w.to_lowercase()).collect();
        self
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn tenure_patterns(&self) -> &[Regex] {
        &self.tenure_patterns
    }

    pub fn mentions_relocation(&self, text: &str) -> bool {
        self.relocation.is_match(text)
    }

    pub fn quoted_phrase(&self) -> &Regex {
        &self.quoted_phrase
    }

    /// Strips a leading bullet (`-`, `*`, `•`, `1.`, `2)`) from a requirement line.
    pub fn strip_bullet<'a>(&self, line: &'a str) -> &'a str {
        match self.bullet_prefix.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        }
    }
}

impl Default for MatchVocabulary {
    fn default() -> Self {
        Self::new(
            DEFAULT_STOP_WORDS,
            DEFAULT_TENURE_PATTERNS,
            DEFAULT_RELOCATION_PATTERN,
        )
        .expect("built-in match vocabulary patterns must compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_builds() {
        let vocab = MatchVocabulary::default();
        assert!(vocab.is_stop_word("the"));
        assert!(!vocab.is_stop_word("rust"));
        assert_eq!(vocab.tenure_patterns().len(), 4);
    }

    #[test]
    fn test_strip_bullet_variants() {
        let vocab = MatchVocabulary::default();
        assert_eq!(vocab.strip_bullet("- Python"), "Python");
        assert_eq!(vocab.strip_bullet("  • Docker"), "Docker");
        assert_eq!(vocab.strip_bullet("2) Kubernetes"), "Kubernetes");
        assert_eq!(vocab.strip_bullet("Terraform"), "Terraform");
    }

    #[test]
    fn test_relocation_phrases() {
        let vocab = MatchVocabulary::default();
        assert!(vocab.mentions_relocation("happy to relocate for the right role"));
        assert!(vocab.mentions_relocation("Willing to move"));
        assert!(vocab.mentions_relocation("open to relocation"));
        assert!(!vocab.mentions_relocation("based in lisbon"));
    }

    #[test]
    fn test_custom_stop_words_replace_defaults() {
        let vocab = MatchVocabulary::default().with_stop_words(&["Rust"]);
        assert!(vocab.is_stop_word("rust"));
        assert!(!vocab.is_stop_word("the"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let result = MatchVocabulary::new(DEFAULT_STOP_WORDS, &["(unclosed"], "relocat");
        assert!(result.is_err());
    }
}
