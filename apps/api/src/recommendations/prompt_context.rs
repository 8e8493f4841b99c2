//! Serialises profiles and jobs into the JSON blocks interpolated into prompts.

use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::{JobListing, ResumeProfile};

/// Job descriptions are cut to this many characters to bound prompt size.
pub const MAX_DESCRIPTION_CHARS: usize = 600;

pub fn profile_json(profile: &ResumeProfile) -> Result<String, AppError> {
    serde_json::to_string_pretty(profile)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))
}

pub fn job_value(job: &JobListing) -> Value {
    json!({
        "id": job.id,
        "title": job.title,
        "company": job.company,
        "location": job.location,
        "requirements": job.requirements,
        "description": truncate_chars(&job.description, MAX_DESCRIPTION_CHARS),
        "salaryRange": job.salary_range,
        "experienceLevel": job.experience_level,
        "industry": job.industry,
    })
}

pub fn job_json(job: &JobListing) -> Result<String, AppError> {
    serde_json::to_string_pretty(&job_value(job))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize job: {e}")))
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
