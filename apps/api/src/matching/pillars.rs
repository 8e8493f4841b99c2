//! The four ATS pillars. Each is a pure function of the profile, the job and the
//! keyword list; none of them can fail, and every score is clamped before it leaves.
//!
//! | pillar                | range   | use                         |
//! |-----------------------|---------|-----------------------------|
//! | keyword density       | 0..=100 | weighted 0.5                |
//! | title & tenure        | 0..=100 | weighted 0.3                |
//! | formatting integrity  | 0..=100 | weighted 0.2                |
//! | gap penalty           | 0..=40  | subtracted after weighting  |

use crate::matching::keywords::MustHaveKeyword;
use crate::matching::tenure::parse_required_years;
use crate::matching::text::normalize;
use crate::matching::vocabulary::MatchVocabulary;
use crate::models::{JobListing, ResumeProfile};

pub const MAX_KEY_STRENGTHS: usize = 10;
pub const MAX_GAP_PENALTY: u8 = 40;

const REPEAT_MULTIPLIER: f64 = 1.1;
const MAX_MULTIPLIER: f64 = 1.15;

const MISSING_CONSIDERED: usize = 5;
const MISSING_PENALTY_EACH: u32 = 6;
const MISSING_PENALTY_CAP: u32 = 25;
const LOCATION_PENALTY: u32 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Keyword density
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordDensity {
    pub score: u8,
    /// Matched phrases in match order, at most 10.
    pub key_strengths: Vec<String>,
    /// Unmatched phrases in keyword order.
    pub missing: Vec<String>,
}

pub fn score_keyword_density(resume_text: &str, keywords: &[MustHaveKeyword]) -> KeywordDensity {
    let normalized_resume = normalize(resume_text);

    let mut total_weight = 0.0_f64;
    let mut matched_weight = 0.0_f64;
    let mut key_strengths = Vec::new();
    let mut missing = Vec::new();

    for keyword in keywords.iter().filter(|k| !k.phrase.trim().is_empty()) {
        let weight = keyword.weight.max(0.0);
        total_weight += weight;

        let variants: Vec<&str> = std::iter::once(keyword.phrase.as_str())
            .chain(keyword.equivalents.iter().map(String::as_str))
            .collect();

        let matched = variants
            .iter()
            .any(|v| phrase_matches(v, resume_text, &normalized_resume));

        if matched {
            let occurrences = variants
                .iter()
                .map(|v| resume_text.matches(v.to_lowercase().as_str()).count())
                .max()
                .unwrap_or(0);
            let multiplier = if occurrences >= 2 { REPEAT_MULTIPLIER } else { 1.0 };
            matched_weight += weight * multiplier.min(MAX_MULTIPLIER);

            if key_strengths.len() < MAX_KEY_STRENGTHS {
                key_strengths.push(keyword.phrase.clone());
            }
        } else {
            missing.push(keyword.phrase.clone());
        }
    }

    let score = if total_weight > 0.0 {
        clamp_score((matched_weight / total_weight * 100.0).round())
    } else {
        0
    };

    KeywordDensity {
        score,
        key_strengths,
        missing,
    }
}

/// Exact match on normalized or raw text, or every token (len ≥ 2) present anywhere.
fn phrase_matches(phrase: &str, resume_text: &str, normalized_resume: &str) -> bool {
    let normalized_phrase = normalize(phrase);
    let raw_phrase = phrase.trim().to_lowercase();

    let exact = (!normalized_phrase.is_empty() && normalized_resume.contains(&normalized_phrase))
        || (!raw_phrase.is_empty() && resume_text.contains(&raw_phrase));
    if exact {
        return true;
    }

    let mut tokens = normalized_phrase
        .split_whitespace()
        .filter(|t| t.chars().count() >= 2)
        .peekable();
    tokens.peek().is_some() && tokens.all(|t| normalized_resume.contains(t))
}

// ────────────────────────────────────────────────────────────────────────────
// Title & tenure alignment
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TitleTenure {
    pub score: u8,
    pub title_score: u8,
    pub tenure_score: u8,
    pub required_years: Option<u32>,
    pub critical_issues: Vec<String>,
}

pub fn score_title_and_tenure(
    profile: &ResumeProfile,
    job: &JobListing,
    vocab: &MatchVocabulary,
) -> TitleTenure {
    let title_score = score_title(profile, job);

    let required_years = parse_required_years(&job.full_text(), vocab);
    let profile_years = profile.years_of_experience.max(0.0);
    let mut critical_issues = Vec::new();

    let tenure_score = match required_years {
        None => 80,
        Some(required) if profile_years >= f64::from(required) => 100,
        Some(required) if profile_years >= f64::from(required) - 1.0 => 70,
        Some(required) => {
            critical_issues.push(format!(
                "Tenure: job requires {required}+ years; profile shows ~{} years",
                display_years(profile_years)
            ));
            clamp_score((profile_years / f64::from(required) * 60.0).round())
        }
    };

    let score =
        clamp_score((f64::from(title_score) * 0.5 + f64::from(tenure_score) * 0.5).round());

    TitleTenure {
        score,
        title_score,
        tenure_score,
        required_years,
        critical_issues,
    }
}

fn score_title(profile: &ResumeProfile, job: &JobListing) -> u8 {
    let job_title = normalize(&job.title);
    let profile_titles: Vec<String> = profile
        .experience
        .iter()
        .map(|e| normalize(&e.title))
        .filter(|t| !t.is_empty())
        .collect();

    if !job_title.is_empty()
        && profile_titles
            .iter()
            .any(|t| t.contains(&job_title) || job_title.contains(t.as_str()))
    {
        return 100;
    }

    let words: Vec<&str> = job_title.split_whitespace().collect();
    if words.is_empty() {
        return 25;
    }

    let overlapping = words
        .iter()
        .filter(|w| profile_titles.iter().any(|t| t.contains(*w)))
        .count();
    let overlap_ratio = overlapping as f64 / words.len() as f64;

    if overlap_ratio >= 0.5 {
        75
    } else if overlap_ratio >= 0.25 {
        50
    } else {
        25
    }
}

fn display_years(years: f64) -> f64 {
    (years * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Formatting integrity
// ────────────────────────────────────────────────────────────────────────────

/// Structural completeness: experience 40, education 30, skills 20, location 10.
pub fn score_formatting(profile: &ResumeProfile) -> u8 {
    let mut score = 0u32;
    if !profile.experience.is_empty() {
        score += 40;
    }
    if !profile.education.is_empty() {
        score += 30;
    }
    if !profile.skills.is_empty() {
        score += 20;
    }
    if profile.location_str().is_some() {
        score += 10;
    }
    score.min(100) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// Gap penalty
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct GapPenalty {
    pub penalty: u8,
    pub messages: Vec<String>,
}

/// Penalises the first five missing keywords and an unaddressed location mismatch.
/// Tenure issues are echoed into the messages but carry no extra penalty.
pub fn score_gap_penalty(
    profile: &ResumeProfile,
    job: &JobListing,
    resume_text: &str,
    missing: &[String],
    critical_issues: &[String],
    vocab: &MatchVocabulary,
) -> GapPenalty {
    let mut messages = Vec::new();

    let considered: Vec<&String> = missing.iter().take(MISSING_CONSIDERED).collect();
    let mut penalty = (considered.len() as u32 * MISSING_PENALTY_EACH).min(MISSING_PENALTY_CAP);
    for phrase in considered {
        messages.push(format!("Missing: \"{phrase}\""));
    }

    if let Some(message) = location_mismatch(profile, job, resume_text, vocab) {
        penalty += LOCATION_PENALTY;
        messages.push(message);
    }

    messages.extend(critical_issues.iter().cloned());

    GapPenalty {
        penalty: penalty.min(u32::from(MAX_GAP_PENALTY)) as u8,
        messages,
    }
}

fn location_mismatch(
    profile: &ResumeProfile,
    job: &JobListing,
    resume_text: &str,
    vocab: &MatchVocabulary,
) -> Option<String> {
    if job.is_remote() {
        return None;
    }

    let city = job
        .location
        .split([',', ';'])
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if city.is_empty() {
        return None;
    }

    let profile_location = profile.location_str();
    let in_city = profile_location
        .map(|l| l.to_lowercase().contains(&city))
        .unwrap_or(false);

    if in_city || vocab.mentions_relocation(resume_text) {
        return None;
    }

    Some(format!(
        "Location: job is based in {}; profile location ({}) does not match and no relocation is mentioned",
        job.location.trim(),
        profile_location.unwrap_or("not specified")
    ))
}

pub(crate) fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0) as u8
}
