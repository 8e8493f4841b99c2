//! Keyword extraction — derives weighted must-have phrases from a job listing.
//!
//! Discovery order (each step skips phrases already seen):
//! 1. quoted phrases, weight 1.2
//! 2. significant title words, weight 1.1
//! 3. requirement lines: single words 1.0, adjacent significant bigrams 1.1
//! 4. most frequent remaining words in the whole listing, weight 1.0
//!
//! The list is capped at 30 and keeps discovery order.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::matching::text::{clean_word, has_letter, tokens};
use crate::matching::vocabulary::MatchVocabulary;
use crate::models::JobListing;

pub const LOCAL_KEYWORD_CAP: usize = 30;
pub const EXTERNAL_KEYWORD_CAP: usize = 5;
pub const MAX_EQUIVALENTS: usize = 2;

const QUOTED_WEIGHT: f64 = 1.2;
const TITLE_WEIGHT: f64 = 1.1;
const REQUIREMENT_WORD_WEIGHT: f64 = 1.0;
const REQUIREMENT_BIGRAM_WEIGHT: f64 = 1.1;
const FREQUENCY_WEIGHT: f64 = 1.0;
const FREQUENCY_TAKE: usize = 20;

const QUOTED_MIN_CHARS: usize = 2;
const QUOTED_MAX_CHARS: usize = 50;
const MIN_BIGRAM_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MustHaveKeyword {
    pub phrase: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equivalents: Vec<String>,
}

impl MustHaveKeyword {
    pub fn new(phrase: impl Into<String>, weight: f64) -> Self {
        Self {
            phrase: phrase.into(),
            weight,
            equivalents: Vec::new(),
        }
    }

    /// Builds the keyword list for externally supplied phrases: the first carries 1.1,
    /// the rest 1.0. At most 5 keywords with at most 2 equivalents each; blank phrases
    /// are skipped.
    pub fn external_list<I>(items: I) -> Vec<MustHaveKeyword>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        items
            .into_iter()
            .filter(|(phrase, _)| !phrase.trim().is_empty())
            .take(EXTERNAL_KEYWORD_CAP)
            .enumerate()
            .map(|(i, (phrase, equivalents))| MustHaveKeyword {
                phrase: phrase.trim().to_string(),
                weight: if i == 0 { 1.1 } else { 1.0 },
                equivalents: equivalents
                    .into_iter()
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty())
                    .take(MAX_EQUIVALENTS)
                    .collect(),
            })
            .collect()
    }
}

/// Insertion-ordered, deduplicating keyword accumulator.
struct KeywordSet {
    seen: HashSet<String>,
    keywords: Vec<MustHaveKeyword>,
}

impl KeywordSet {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            keywords: Vec::new(),
        }
    }

    fn push(&mut self, phrase: String, weight: f64) {
        if self.seen.insert(phrase.clone()) {
            self.keywords.push(MustHaveKeyword::new(phrase, weight));
        }
    }

    fn contains(&self, phrase: &str) -> bool {
        self.seen.contains(phrase)
    }
}

/// Extracts must-have keywords from a job listing.
pub fn extract_keywords(job: &JobListing, vocab: &MatchVocabulary) -> Vec<MustHaveKeyword> {
    let text = job.full_text();
    let mut set = KeywordSet::new();

    for caps in vocab.quoted_phrase().captures_iter(&text) {
        let phrase = caps[1].trim().to_lowercase();
        let len = phrase.chars().count();
        if (QUOTED_MIN_CHARS..=QUOTED_MAX_CHARS).contains(&len) {
            set.push(phrase, QUOTED_WEIGHT);
        }
    }

    for word in job.title.split_whitespace().map(clean_word) {
        if is_significant(&word, vocab) {
            set.push(word, TITLE_WEIGHT);
        }
    }

    for line in job.requirements.lines() {
        let line = vocab.strip_bullet(line);
        let words: Vec<String> = line.split_whitespace().map(clean_word).collect();

        for word in &words {
            if is_significant(word, vocab) {
                set.push(word.clone(), REQUIREMENT_WORD_WEIGHT);
            }
        }

        for pair in words.windows(2) {
            if is_significant(&pair[0], vocab) && is_significant(&pair[1], vocab) {
                let bigram = format!("{} {}", pair[0], pair[1]);
                if bigram.chars().count() >= MIN_BIGRAM_CHARS {
                    set.push(bigram, REQUIREMENT_BIGRAM_WEIGHT);
                }
            }
        }
    }

    for word in frequent_words(&text, vocab, &set) {
        set.push(word, FREQUENCY_WEIGHT);
    }

    let mut keywords = set.keywords;
    keywords.truncate(LOCAL_KEYWORD_CAP);
    keywords
}

fn is_significant(word: &str, vocab: &MatchVocabulary) -> bool {
    word.chars().count() >= 2 && has_letter(word) && !vocab.is_stop_word(word)
}

/// Top words by frequency not yet captured. Ties go to the word seen first.
fn frequent_words(text: &str, vocab: &MatchVocabulary, captured: &KeywordSet) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for (position, word) in tokens(text).enumerate() {
        if word.chars().count() < 3
            || !has_letter(&word)
            || vocab.is_stop_word(&word)
            || captured.contains(&word)
        {
            continue;
        }
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(FREQUENCY_TAKE)
        .map(|(word, _)| word)
        .collect()
}
