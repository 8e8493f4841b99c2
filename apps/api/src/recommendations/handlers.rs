use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{JobListing, ResumeProfile};
use crate::recommendations::estimates::{
    estimate_success, predict_salary, SalaryPrediction, SuccessProbability,
};
use crate::recommendations::ranker::{rank_jobs, JobRecommendation, RankRequest, DEFAULT_LIMIT};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsRequest {
    pub profile: ResumeProfile,
    #[serde(default)]
    pub jobs: Vec<JobListing>,
    pub limit: Option<usize>,
    pub search_goal: Option<String>,
    pub caller_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub profile: ResumeProfile,
    pub job: JobListing,
    pub caller_id: Option<String>,
}

/// Completion calls are always attributed; anonymous callers get a fresh id.
fn caller_id_or_new(caller_id: Option<String>) -> String {
    caller_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// POST /api/v1/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Json(req): Json<RecommendationsRequest>,
) -> Result<Json<Vec<JobRecommendation>>, AppError> {
    let limit = req.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }
    if req.jobs.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let caller_id = caller_id_or_new(req.caller_id);
    let request = RankRequest {
        profile: &req.profile,
        jobs: &req.jobs,
        limit,
        search_goal: req.search_goal.as_deref(),
        caller_id: &caller_id,
    };
    let recommendations = rank_jobs(
        state.completion.as_ref(),
        &state.settings,
        &state.vocabulary,
        &request,
    )
    .await?;
    Ok(Json(recommendations))
}

/// POST /api/v1/predictions/salary
pub async fn handle_salary_prediction(
    State(state): State<AppState>,
    Json(req): Json<PredictionRequest>,
) -> Result<Json<SalaryPrediction>, AppError> {
    let caller_id = caller_id_or_new(req.caller_id);
    let prediction = predict_salary(
        state.completion.as_ref(),
        &state.settings,
        &req.profile,
        &req.job,
        &caller_id,
    )
    .await?;
    Ok(Json(prediction))
}

/// POST /api/v1/predictions/success
pub async fn handle_success_probability(
    State(state): State<AppState>,
    Json(req): Json<PredictionRequest>,
) -> Result<Json<SuccessProbability>, AppError> {
    let caller_id = caller_id_or_new(req.caller_id);
    let estimate = estimate_success(
        state.completion.as_ref(),
        &state.settings,
        &req.profile,
        &req.job,
        &caller_id,
    )
    .await?;
    Ok(Json(estimate))
}
