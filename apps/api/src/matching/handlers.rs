use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::matching::ats::{score_job, AtsJobScoreResult};
use crate::matching::keywords::{extract_keywords, MustHaveKeyword};
use crate::matching::quick_match::{rank_quick, QuickMatchScore};
use crate::models::{JobListing, ResumeProfile};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct KeywordsRequest {
    pub job: JobListing,
}

/// A caller-supplied must-have keyword: a bare phrase or a phrase with equivalents.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum KeywordInput {
    Phrase(String),
    Detailed {
        #[serde(alias = "keyword")]
        phrase: String,
        #[serde(default)]
        equivalents: Vec<String>,
    },
}

impl KeywordInput {
    fn into_parts(self) -> (String, Vec<String>) {
        match self {
            KeywordInput::Phrase(phrase) => (phrase, Vec::new()),
            KeywordInput::Detailed {
                phrase,
                equivalents,
            } => (phrase, equivalents),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsScoreRequest {
    pub profile: ResumeProfile,
    pub job: JobListing,
    #[serde(default)]
    pub must_have_keywords: Vec<KeywordInput>,
}

#[derive(Deserialize)]
pub struct QuickScoreRequest {
    pub profile: ResumeProfile,
    pub jobs: Vec<JobListing>,
}

/// POST /api/v1/match/keywords
pub async fn handle_extract_keywords(
    State(state): State<AppState>,
    Json(req): Json<KeywordsRequest>,
) -> Result<Json<Vec<MustHaveKeyword>>, AppError> {
    Ok(Json(extract_keywords(&req.job, &state.vocabulary)))
}

/// POST /api/v1/match/ats-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    Json(req): Json<AtsScoreRequest>,
) -> Result<Json<AtsJobScoreResult>, AppError> {
    let supplied =
        MustHaveKeyword::external_list(req.must_have_keywords.into_iter().map(KeywordInput::into_parts));
    let result = score_job(&req.profile, &req.job, Some(supplied.as_slice()), &state.vocabulary);
    tracing::debug!("ATS score for job {}: {}", req.job.id, result.ats_score);
    Ok(Json(result))
}

/// POST /api/v1/match/quick-score
pub async fn handle_quick_score(
    Json(req): Json<QuickScoreRequest>,
) -> Result<Json<Vec<QuickMatchScore>>, AppError> {
    Ok(Json(rank_quick(&req.profile, &req.jobs)))
}
