//! ATS score aggregation — runs the four pillars and folds them into one 0–100 score.
//!
//! `weighted = keyword×0.5 + title_tenure×0.3 + formatting×0.2`, then the gap penalty is
//! subtracted from the weighted sum and the result clamped.

use serde::{Deserialize, Serialize};

use crate::matching::keywords::{extract_keywords, MustHaveKeyword};
use crate::matching::pillars::{
    clamp_score, score_formatting, score_gap_penalty, score_keyword_density,
    score_title_and_tenure,
};
use crate::matching::vocabulary::MatchVocabulary;
use crate::models::{JobListing, ResumeProfile};

pub const KEYWORD_WEIGHT: f64 = 0.5;
pub const TITLE_TENURE_WEIGHT: f64 = 0.3;
pub const FORMATTING_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsBreakdown {
    pub keyword_density: u8,
    pub title_and_experience: u8,
    pub formatting_integrity: u8,
    /// 0..=40, subtracted after weighting.
    pub gap_penalty: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsJobScoreResult {
    pub ats_score: u8,
    pub key_strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub critical_match_issues: Vec<String>,
    pub breakdown: AtsBreakdown,
}

/// Scores a profile against a job. Externally supplied keywords replace local
/// extraction when the list is non-empty.
pub fn score_job(
    profile: &ResumeProfile,
    job: &JobListing,
    supplied_keywords: Option<&[MustHaveKeyword]>,
    vocab: &MatchVocabulary,
) -> AtsJobScoreResult {
    let extracted;
    let keywords = match supplied_keywords {
        Some(keywords) if !keywords.is_empty() => keywords,
        _ => {
            extracted = extract_keywords(job, vocab);
            extracted.as_slice()
        }
    };

    let resume_text = profile.resume_text();

    let density = score_keyword_density(&resume_text, keywords);
    let title_tenure = score_title_and_tenure(profile, job, vocab);
    let formatting = score_formatting(profile);
    let gap = score_gap_penalty(
        profile,
        job,
        &resume_text,
        &density.missing,
        &title_tenure.critical_issues,
        vocab,
    );

    let breakdown = AtsBreakdown {
        keyword_density: density.score,
        title_and_experience: title_tenure.score,
        formatting_integrity: formatting,
        gap_penalty: gap.penalty,
    };

    AtsJobScoreResult {
        ats_score: aggregate(&breakdown),
        key_strengths: density.key_strengths,
        gaps: gap.messages,
        critical_match_issues: title_tenure.critical_issues,
        breakdown,
    }
}

/// Weighted pillar sum minus the gap penalty, rounded and clamped to 0..=100.
pub fn aggregate(breakdown: &AtsBreakdown) -> u8 {
    let weighted = f64::from(breakdown.keyword_density) * KEYWORD_WEIGHT
        + f64::from(breakdown.title_and_experience) * TITLE_TENURE_WEIGHT
        + f64::from(breakdown.formatting_integrity) * FORMATTING_WEIGHT;
    clamp_score((weighted - f64::from(breakdown.gap_penalty)).round())
}
