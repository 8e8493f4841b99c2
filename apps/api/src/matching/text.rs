//! Text normalization shared by the extractor and the pillar scorers.

/// Lowercases, replaces punctuation with spaces and collapses whitespace.
/// `+` and `#` survive so `c++` and `c#` stay distinct tokens.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if is_word_char(c) { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercases a single word and trims surrounding punctuation.
pub fn clean_word(word: &str) -> String {
    word.trim_matches(|c: char| !is_word_char(c)).to_lowercase()
}

/// Splits into lowercased word tokens on anything that is not a word character.
pub fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !is_word_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

pub fn has_letter(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}
