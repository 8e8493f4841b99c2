//! Quick match — a synchronous, network-free heuristic for hot paths (list views,
//! sorting search results). Four additive signals:
//! skills ≤40, experience level ≤20, location ≤20, title overlap ≤20.

use serde::Serialize;

use crate::matching::pillars::clamp_score;
use crate::models::{JobListing, ResumeProfile};

const SKILLS_MAX: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickMatchScore {
    pub job_id: String,
    pub score: u8,
}

pub fn quick_match_score(profile: &ResumeProfile, job: &JobListing) -> u8 {
    let total = skills_signal(profile, job)
        + experience_level_signal(profile, job)
        + location_signal(profile, job)
        + title_signal(profile, job);
    clamp_score(total.round())
}

/// Scores every job and orders them best first; equal scores keep input order.
pub fn rank_quick(profile: &ResumeProfile, jobs: &[JobListing]) -> Vec<QuickMatchScore> {
    let mut scores: Vec<QuickMatchScore> = jobs
        .iter()
        .map(|job| QuickMatchScore {
            job_id: job.id.clone(),
            score: quick_match_score(profile, job),
        })
        .collect();
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores
}

fn skills_signal(profile: &ResumeProfile, job: &JobListing) -> f64 {
    let haystack = format!("{} {} {}", job.title, job.description, job.requirements).to_lowercase();
    let present = profile
        .skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && haystack.contains(s.as_str()))
        .count();
    present as f64 / profile.skills.len().max(1) as f64 * SKILLS_MAX
}

fn experience_level_signal(profile: &ResumeProfile, job: &JobListing) -> f64 {
    let level = match job.experience_level.as_deref().map(str::trim) {
        Some(level) if !level.is_empty() => level.to_lowercase(),
        _ => return 10.0,
    };
    let years = profile.years_of_experience;

    if years >= 3.0 && level.contains("senior") {
        20.0
    } else if years >= 1.0 && level.contains("mid") {
        15.0
    } else if years < 2.0 && level.contains("entry") {
        20.0
    } else {
        10.0
    }
}

fn location_signal(profile: &ResumeProfile, job: &JobListing) -> f64 {
    if job.is_remote() {
        return 20.0;
    }
    let job_location = job.location.trim().to_lowercase();
    let matches = match profile.location_str() {
        Some(location) if !job_location.is_empty() => {
            let location = location.to_lowercase();
            job_location.contains(&location) || location.contains(&job_location)
        }
        _ => false,
    };
    if matches {
        20.0
    } else {
        5.0
    }
}

fn title_signal(profile: &ResumeProfile, job: &JobListing) -> f64 {
    let job_title = job.title.trim().to_lowercase();
    if job_title.is_empty() {
        return 5.0;
    }
    let overlaps = profile
        .experience
        .iter()
        .map(|e| e.title.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .any(|t| job_title.contains(&t) || t.contains(&job_title));
    if overlaps {
        20.0
    } else {
        5.0
    }
}
