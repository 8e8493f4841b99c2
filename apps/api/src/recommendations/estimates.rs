//! Salary prediction and success probability.
//!
//! Both delegate the estimate to the completion service and validate whatever comes
//! back in one step: every number is coerced and clamped, every missing field takes a
//! neutral default. Unparsable output yields a neutral estimate, never an error; only a
//! failed round trip does.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::extract::{
    coerce_f64, extract_json, percent_or, string_list, JsonShape,
};
use crate::llm_client::prompts::{render_template, CALIBRATION_INSTRUCTION};
use crate::llm_client::{CompletionRequest, CompletionService, CompletionSettings};
use crate::models::{JobListing, ResumeProfile};
use crate::recommendations::prompt_context::{job_json, profile_json};
use crate::recommendations::prompts::{
    SALARY_PROMPT_TEMPLATE, SALARY_SYSTEM, SUCCESS_PROMPT_TEMPLATE, SUCCESS_SYSTEM,
};

pub const NEUTRAL_PERCENT: u8 = 50;
/// Upper bound for salary figures, in thousands.
pub const MAX_SALARY_THOUSANDS: f64 = 10_000.0;
const DEFAULT_CURRENCY: &str = "USD";

// ────────────────────────────────────────────────────────────────────────────
// Salary
// ────────────────────────────────────────────────────────────────────────────

/// Annual salary estimate. Figures are in thousands with min ≤ median ≤ max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPrediction {
    pub min_salary: f64,
    pub median_salary: f64,
    pub max_salary: f64,
    pub currency: String,
    pub percentile: u8,
    pub confidence: u8,
    pub factors: Vec<String>,
}

impl SalaryPrediction {
    /// Validates a salary object. Reads a nested `salaryPrediction` object if present.
    pub fn from_value(value: &Value) -> Self {
        let source = value
            .get("salaryPrediction")
            .filter(|v| v.is_object())
            .unwrap_or(value);

        let figure = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| source.get(*k).and_then(coerce_f64))
                .map(|n| n.clamp(0.0, MAX_SALARY_THOUSANDS))
        };
        let min = figure(&["minSalary", "min"]);
        let median = figure(&["medianSalary", "median"]);
        let max = figure(&["maxSalary", "max"]);

        let median = median.or(match (min, max) {
            (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
            _ => min.or(max),
        });
        let median = median.unwrap_or(0.0);

        let mut figures = [min.unwrap_or(median), median, max.unwrap_or(median)];
        figures.sort_by(|a, b| a.total_cmp(b));
        let [min_salary, median_salary, max_salary] = figures.map(round_tenth);

        let currency = source
            .get("currency")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_uppercase();

        Self {
            min_salary,
            median_salary,
            max_salary,
            currency,
            percentile: percent_or(source.get("percentile"), NEUTRAL_PERCENT),
            confidence: percent_or(source.get("confidence"), NEUTRAL_PERCENT),
            factors: string_list(source.get("factors")),
        }
    }
}

fn round_tenth(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Success probability
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessProbability {
    pub overall_probability: u8,
    pub interview_probability: u8,
    pub offer_probability: u8,
    pub skill_match: u8,
    pub experience_match: u8,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
}

impl Default for SuccessProbability {
    fn default() -> Self {
        Self {
            overall_probability: NEUTRAL_PERCENT,
            interview_probability: NEUTRAL_PERCENT,
            offer_probability: NEUTRAL_PERCENT,
            skill_match: NEUTRAL_PERCENT,
            experience_match: NEUTRAL_PERCENT,
            strengths: Vec::new(),
            risks: Vec::new(),
        }
    }
}

impl SuccessProbability {
    /// Validates a success-probability object. Each field is read from the top level
    /// first, then from a nested `successProbability` object.
    pub fn from_value(value: &Value) -> Self {
        let nested = value.get("successProbability").filter(|v| v.is_object());
        let field = |key: &str| {
            value
                .get(key)
                .or_else(|| nested.and_then(|n| n.get(key)))
        };

        Self {
            overall_probability: percent_or(field("overallProbability"), NEUTRAL_PERCENT),
            interview_probability: percent_or(field("interviewProbability"), NEUTRAL_PERCENT),
            offer_probability: percent_or(field("offerProbability"), NEUTRAL_PERCENT),
            skill_match: percent_or(field("skillMatch"), NEUTRAL_PERCENT),
            experience_match: percent_or(field("experienceMatch"), NEUTRAL_PERCENT),
            strengths: string_list(field("strengths")),
            risks: string_list(field("risks")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Estimators
// ────────────────────────────────────────────────────────────────────────────

/// Predicts the salary range for `profile` in `job`. One completion round trip.
pub async fn predict_salary(
    completion: &dyn CompletionService,
    settings: &CompletionSettings,
    profile: &ResumeProfile,
    job: &JobListing,
    caller_id: &str,
) -> Result<SalaryPrediction, AppError> {
    let profile_json = profile_json(profile)?;
    let job_json = job_json(job)?;
    let prompt = render_template(
        SALARY_PROMPT_TEMPLATE,
        &[
            ("profile_json", profile_json.as_str()),
            ("job_json", job_json.as_str()),
            ("calibration", CALIBRATION_INSTRUCTION),
        ],
    );

    let request = CompletionRequest {
        prompt,
        system_message: SALARY_SYSTEM.to_string(),
        model: settings.model.clone(),
        caller_id: caller_id.to_string(),
        feature: "salary_prediction".to_string(),
        timeout: settings.estimation_timeout,
    };

    let response = completion
        .complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Salary prediction failed: {e}")))?;

    let parsed = extract_json(&response.content, JsonShape::Any);
    if parsed.is_fallback() {
        warn!("Salary prediction for job {} was unparsable, using neutral estimate", job.id);
    }
    let prediction = SalaryPrediction::from_value(parsed.value());

    info!(
        "Salary prediction for job {}: {}-{}k {}",
        job.id, prediction.min_salary, prediction.max_salary, prediction.currency
    );
    Ok(prediction)
}

/// Estimates interview/offer chances for `profile` in `job`. One completion round trip.
pub async fn estimate_success(
    completion: &dyn CompletionService,
    settings: &CompletionSettings,
    profile: &ResumeProfile,
    job: &JobListing,
    caller_id: &str,
) -> Result<SuccessProbability, AppError> {
    let profile_json = profile_json(profile)?;
    let job_json = job_json(job)?;
    let prompt = render_template(
        SUCCESS_PROMPT_TEMPLATE,
        &[
            ("profile_json", profile_json.as_str()),
            ("job_json", job_json.as_str()),
            ("calibration", CALIBRATION_INSTRUCTION),
        ],
    );

    let request = CompletionRequest {
        prompt,
        system_message: SUCCESS_SYSTEM.to_string(),
        model: settings.model.clone(),
        caller_id: caller_id.to_string(),
        feature: "success_probability".to_string(),
        timeout: settings.estimation_timeout,
    };

    let response = completion
        .complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Success estimation failed: {e}")))?;

    let parsed = extract_json(&response.content, JsonShape::Any);
    if parsed.is_fallback() {
        warn!("Success estimate for job {} was unparsable, using neutral estimate", job.id);
    }
    let estimate = SuccessProbability::from_value(parsed.value());

    info!(
        "Success estimate for job {}: overall {}%",
        job.id, estimate.overall_probability
    );
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::extract::fallback_value;
    use crate::llm_client::testing::ScriptedCompletion;
    use serde_json::json;
    use std::time::Duration;

    fn job() -> JobListing {
        JobListing {
            id: "j-1".to_string(),
            title: "Data Engineer".to_string(),
            location: "Chicago, IL".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_salary_full_object() {
        let prediction = SalaryPrediction::from_value(&json!({
            "minSalary": 110, "medianSalary": "125", "maxSalary": 140.04,
            "currency": "eur", "percentile": 61.6, "confidence": 70,
            "factors": ["Spark demand"]
        }));
        assert_eq!(prediction.min_salary, 110.0);
        assert_eq!(prediction.median_salary, 125.0);
        assert_eq!(prediction.max_salary, 140.0);
        assert_eq!(prediction.currency, "EUR");
        assert_eq!(prediction.percentile, 62);
        assert_eq!(prediction.factors, vec!["Spark demand"]);
    }

    #[test]
    fn test_salary_reorders_and_clamps() {
        let prediction = SalaryPrediction::from_value(&json!({
            "minSalary": 150, "medianSalary": -20, "maxSalary": 90, "percentile": 180
        }));
        assert_eq!(prediction.min_salary, 0.0);
        assert_eq!(prediction.median_salary, 90.0);
        assert_eq!(prediction.max_salary, 150.0);
        assert_eq!(prediction.percentile, 100);
    }

    #[test]
    fn test_salary_median_derived_from_bounds() {
        let prediction = SalaryPrediction::from_value(&json!({"min": 100, "max": 120}));
        assert_eq!(prediction.median_salary, 110.0);
    }

    #[test]
    fn test_salary_reads_nested_object() {
        let prediction = SalaryPrediction::from_value(&json!({
            "jobId": "1", "salaryPrediction": {"minSalary": 80, "maxSalary": 95}
        }));
        assert_eq!(prediction.min_salary, 80.0);
        assert_eq!(prediction.max_salary, 95.0);
    }

    #[test]
    fn test_salary_fallback_is_neutral() {
        let prediction = SalaryPrediction::from_value(&fallback_value());
        assert_eq!(prediction.median_salary, 0.0);
        assert_eq!(prediction.currency, "USD");
        assert_eq!(prediction.percentile, NEUTRAL_PERCENT);
        assert_eq!(prediction.confidence, NEUTRAL_PERCENT);
    }

    #[test]
    fn test_success_fallback_reads_overall_probability() {
        let estimate = SuccessProbability::from_value(&fallback_value());
        assert_eq!(estimate, SuccessProbability::default());
    }

    #[test]
    fn test_success_clamps_and_coerces() {
        let estimate = SuccessProbability::from_value(&json!({
            "overallProbability": "72", "interviewProbability": 130,
            "offerProbability": -5, "skillMatch": "n/a", "risks": ["Gap in 2021"]
        }));
        assert_eq!(estimate.overall_probability, 72);
        assert_eq!(estimate.interview_probability, 100);
        assert_eq!(estimate.offer_probability, 0);
        assert_eq!(estimate.skill_match, NEUTRAL_PERCENT);
        assert_eq!(estimate.risks, vec!["Gap in 2021"]);
    }

    #[test]
    fn test_success_reads_nested_object() {
        let estimate = SuccessProbability::from_value(&json!({
            "successProbability": {"overallProbability": 33, "offerProbability": 20}
        }));
        assert_eq!(estimate.overall_probability, 33);
        assert_eq!(estimate.offer_probability, 20);
    }

    #[tokio::test]
    async fn test_predict_salary_uses_estimation_timeout_and_feature() {
        let completion = ScriptedCompletion::replying(
            "```json\n{\"minSalary\": 100, \"maxSalary\": 130, \"currency\": \"USD\"}\n```",
        );
        let settings = CompletionSettings::default();

        let prediction =
            predict_salary(&completion, &settings, &ResumeProfile::default(), &job(), "user-7")
                .await
                .unwrap();

        assert_eq!(prediction.median_salary, 115.0);
        let requests = completion.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].feature, "salary_prediction");
        assert_eq!(requests[0].caller_id, "user-7");
        assert_eq!(requests[0].timeout, Duration::from_secs(45));
        assert!(requests[0].prompt.contains("Data Engineer"));
    }

    #[tokio::test]
    async fn test_estimate_success_garbage_is_neutral_not_error() {
        let completion = ScriptedCompletion::replying("I cannot help with that.");
        let estimate = estimate_success(
            &completion,
            &CompletionSettings::default(),
            &ResumeProfile::default(),
            &job(),
            "user-7",
        )
        .await
        .unwrap();
        assert_eq!(estimate.overall_probability, NEUTRAL_PERCENT);
    }

    #[tokio::test]
    async fn test_estimate_success_network_failure_is_error() {
        let completion = ScriptedCompletion::failing(503);
        let result = estimate_success(
            &completion,
            &CompletionSettings::default(),
            &ResumeProfile::default(),
            &job(),
            "user-7",
        )
        .await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }
}
