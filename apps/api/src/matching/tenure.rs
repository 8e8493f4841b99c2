//! Tenure parsing — pulls a required-years figure out of free job text.

use crate::matching::vocabulary::MatchVocabulary;

/// Returns the years required by the first matching tenure pattern, in precedence order:
/// "minimum/at least N years", "N+ years", "N-M years" (lower bound), "N years experience".
/// A match whose number does not fit a `u32` is skipped, not treated as the answer.
pub fn parse_required_years(text: &str, vocab: &MatchVocabulary) -> Option<u32> {
    vocab.tenure_patterns().iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .find_map(|caps| caps.get(1)?.as_str().parse().ok())
    })
}
