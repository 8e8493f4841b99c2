//! AI-assisted job ranking.
//!
//! One completion round trip ranks up to 20 jobs. Each AI entry is validated, matched
//! back to its listing by string-coerced id, and merged with a local ATS run that uses
//! the AI's must-have keywords when it supplied any. The AI's order is kept.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::extract::{
    coerce_f64, coerce_id, extract_json, percent_or, string_list, JsonShape,
};
use crate::llm_client::prompts::{render_template, CALIBRATION_INSTRUCTION};
use crate::llm_client::{CompletionRequest, CompletionService, CompletionSettings};
use crate::matching::ats::{score_job, AtsBreakdown};
use crate::matching::keywords::MustHaveKeyword;
use crate::matching::pillars::clamp_score;
use crate::matching::vocabulary::MatchVocabulary;
use crate::models::{JobListing, ResumeProfile};
use crate::recommendations::estimates::{SalaryPrediction, SuccessProbability, NEUTRAL_PERCENT};
use crate::recommendations::prompt_context::{job_value, profile_json};
use crate::recommendations::prompts::{
    NO_SEARCH_GOAL, RANKING_PROMPT_TEMPLATE, RANKING_SYSTEM, SEARCH_GOAL_TEMPLATE,
};

/// Only this many jobs are sent to the completion service.
pub const MAX_PROMPT_JOBS: usize = 20;
pub const DEFAULT_LIMIT: usize = 10;

const WHY_MATCH_PREFIX: &str = "Your profile aligns with this role: ";

pub struct RankRequest<'a> {
    pub profile: &'a ResumeProfile,
    pub jobs: &'a [JobListing],
    pub limit: usize,
    pub search_goal: Option<&'a str>,
    pub caller_id: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecommendation {
    pub job: JobListing,
    pub match_score: u8,
    pub ats_score: u8,
    pub confidence: u8,
    pub reasons: Vec<String>,
    pub why_match: String,
    pub salary_prediction: Option<SalaryPrediction>,
    pub success_probability: Option<SuccessProbability>,
    pub recommended_actions: Vec<String>,
    pub key_strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub breakdown: AtsBreakdown,
}

/// One validated entry of the ranking response.
#[derive(Debug, Clone)]
struct AiRecommendation {
    job_id: String,
    match_score: u8,
    must_have_keywords: Vec<MustHaveKeyword>,
    confidence: u8,
    reasons: Vec<String>,
    salary_prediction: Option<SalaryPrediction>,
    success_probability: Option<SuccessProbability>,
    recommended_actions: Vec<String>,
}

impl AiRecommendation {
    /// `None` when the entry carries no usable job id.
    fn from_value(entry: &Value) -> Option<Self> {
        let job_id = entry
            .get("jobId")
            .or_else(|| entry.get("id"))
            .and_then(coerce_id)
            .filter(|id| !id.is_empty())?;

        Some(Self {
            job_id,
            match_score: resolve_match_score(entry),
            must_have_keywords: parse_keywords(entry.get("mustHaveKeywords")),
            confidence: percent_or(entry.get("confidence"), NEUTRAL_PERCENT),
            reasons: string_list(entry.get("reasons")),
            salary_prediction: entry
                .get("salaryPrediction")
                .filter(|v| v.is_object())
                .map(SalaryPrediction::from_value),
            success_probability: entry
                .get("successProbability")
                .filter(|v| v.is_object())
                .map(SuccessProbability::from_value),
            recommended_actions: string_list(entry.get("recommendedActions")),
        })
    }
}

/// `matchScore` if it is a finite number above zero, else
/// `successProbability.overallProbability`, else 0. A literal 0 from the model is
/// indistinguishable from a missing score and takes the second branch.
pub fn resolve_match_score(entry: &Value) -> u8 {
    if let Some(score) = entry
        .get("matchScore")
        .and_then(coerce_f64)
        .filter(|s| *s > 0.0)
    {
        return clamp_score(score.round());
    }
    entry
        .get("successProbability")
        .and_then(|sp| sp.get("overallProbability"))
        .and_then(coerce_f64)
        .map(|p| clamp_score(p.round()))
        .unwrap_or(0)
}

/// Accepts plain strings or `{phrase|keyword, equivalents}` objects.
fn parse_keywords(value: Option<&Value>) -> Vec<MustHaveKeyword> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    let pairs = items.iter().filter_map(|item| match item {
        Value::String(phrase) => Some((phrase.clone(), Vec::new())),
        Value::Object(obj) => {
            let phrase = obj
                .get("phrase")
                .or_else(|| obj.get("keyword"))
                .and_then(Value::as_str)?;
            Some((phrase.to_string(), string_list(obj.get("equivalents"))))
        }
        _ => None,
    });
    MustHaveKeyword::external_list(pairs)
}

/// Entries of the ranking array. A lone object (no array anywhere in the response) is
/// treated as a single entry.
fn ai_entries(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

/// Joins reasons into one sentence: `A`, `A and B`, `A, B, and C`.
pub fn why_match_sentence(reasons: &[String]) -> String {
    let parts: Vec<&str> = reasons.iter().map(String::as_str).collect();

    let joined = match parts.as_slice() {
        [] => return String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    };
    format!("{WHY_MATCH_PREFIX}{joined}.")
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking
// ────────────────────────────────────────────────────────────────────────────

fn build_prompt(request: &RankRequest<'_>, candidates: &[JobListing]) -> Result<String, AppError> {
    let jobs: Vec<Value> = candidates.iter().map(job_value).collect();
    let jobs_json = serde_json::to_string_pretty(&jobs)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize jobs: {e}")))?;

    let search_goal = match request.search_goal.map(str::trim).filter(|g| !g.is_empty()) {
        Some(goal) => render_template(SEARCH_GOAL_TEMPLATE, &[("goal", goal)]),
        None => NO_SEARCH_GOAL.to_string(),
    };
    let limit = request.limit.min(candidates.len()).to_string();
    let profile_json = profile_json(request.profile)?;

    Ok(render_template(
        RANKING_PROMPT_TEMPLATE,
        &[
            ("profile_json", profile_json.as_str()),
            ("jobs_json", jobs_json.as_str()),
            ("search_goal", search_goal.as_str()),
            ("limit", limit.as_str()),
            ("calibration", CALIBRATION_INSTRUCTION),
        ],
    ))
}

fn merge(
    ai: AiRecommendation,
    job: &JobListing,
    profile: &ResumeProfile,
    vocab: &MatchVocabulary,
) -> JobRecommendation {
    let ats = score_job(profile, job, Some(ai.must_have_keywords.as_slice()), vocab);
    JobRecommendation {
        job: job.clone(),
        match_score: ai.match_score,
        ats_score: ats.ats_score,
        confidence: ai.confidence,
        why_match: why_match_sentence(&ai.reasons),
        reasons: ai.reasons,
        salary_prediction: ai.salary_prediction,
        success_probability: ai.success_probability,
        recommended_actions: ai.recommended_actions,
        key_strengths: ats.key_strengths,
        gaps: ats.gaps,
        breakdown: ats.breakdown,
    }
}

/// Ranks `request.jobs` for the profile. Fails only when the completion call itself
/// fails; an unparsable answer yields an empty ranking.
pub async fn rank_jobs(
    completion: &dyn CompletionService,
    settings: &CompletionSettings,
    vocab: &MatchVocabulary,
    request: &RankRequest<'_>,
) -> Result<Vec<JobRecommendation>, AppError> {
    if request.jobs.is_empty() || request.limit == 0 {
        return Ok(Vec::new());
    }

    let candidates = &request.jobs[..request.jobs.len().min(MAX_PROMPT_JOBS)];
    if candidates.len() < request.jobs.len() {
        info!(
            "Ranking the first {} of {} jobs",
            candidates.len(),
            request.jobs.len()
        );
    }

    let completion_request = CompletionRequest {
        prompt: build_prompt(request, candidates)?,
        system_message: RANKING_SYSTEM.to_string(),
        model: settings.model.clone(),
        caller_id: request.caller_id.to_string(),
        feature: "job_recommendations".to_string(),
        timeout: settings.ranking_timeout,
    };

    let response = completion
        .complete(&completion_request)
        .await
        .map_err(|e| AppError::Llm(format!("Job ranking failed: {e}")))?;

    let parsed = extract_json(&response.content, JsonShape::Array);
    if parsed.is_fallback() {
        warn!("Job ranking response was unparsable, returning no recommendations");
    }
    let value = parsed.into_inner();

    let mut by_id: HashMap<&str, &JobListing> = HashMap::new();
    for job in candidates {
        by_id.entry(job.id.trim()).or_insert(job);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut recommendations = Vec::new();
    for ai in ai_entries(&value)
        .into_iter()
        .filter_map(AiRecommendation::from_value)
    {
        if recommendations.len() >= request.limit {
            break;
        }
        let Some(job) = by_id.get(ai.job_id.as_str()).copied() else {
            warn!("Dropping ranking entry for unknown job id {}", ai.job_id);
            continue;
        };
        if !seen.insert(ai.job_id.clone()) {
            continue;
        }
        recommendations.push(merge(ai, job, request.profile, vocab));
    }

    info!(
        "Ranked {} of {} jobs for caller {}",
        recommendations.len(),
        candidates.len(),
        request.caller_id
    );
    Ok(recommendations)
}
