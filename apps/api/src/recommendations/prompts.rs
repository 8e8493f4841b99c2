// Prompt constants for job ranking and the salary / success estimators.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for job ranking.
pub const RANKING_SYSTEM: &str = "You are an expert technical recruiter and career strategist. \
    You rank job listings for a single candidate and explain each ranking briefly. \
    You MUST respond with a JSON array only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences.";

/// Job ranking prompt template.
/// Replace: {profile_json}, {jobs_json}, {search_goal}, {limit}, {calibration}
pub const RANKING_PROMPT_TEMPLATE: &str = r#"Rank the jobs below for this candidate, best fit first.

CANDIDATE PROFILE:
{profile_json}

{search_goal}

JOBS (use the exact "id" values):
{jobs_json}

Return a JSON ARRAY with at most {limit} entries, ordered best fit first:
[
  {
    "jobId": "the-exact-id-from-the-jobs-list",
    "matchScore": 78,
    "mustHaveKeywords": [
      {"phrase": "Kubernetes", "equivalents": ["k8s", "EKS"]}
    ],
    "confidence": 70,
    "reasons": ["5 years of backend Python", "Led a Docker migration"],
    "salaryPrediction": {"minSalary": 120, "medianSalary": 135, "maxSalary": 150, "currency": "USD", "percentile": 60, "confidence": 55},
    "successProbability": {"overallProbability": 62, "interviewProbability": 70, "offerProbability": 40},
    "recommendedActions": ["Add measurable impact to the Docker migration bullet"]
  }
]

RULES:
1. `jobId` MUST be one of the ids above, copied exactly
2. At most 5 `mustHaveKeywords`, each with at most 2 `equivalents`; the first is the most important
3. Salary figures are annual, in THOUSANDS of the listing's currency
4. {calibration}"#;

/// Search-goal line when the caller supplied one. Replace: {goal}
pub const SEARCH_GOAL_TEMPLATE: &str =
    "CANDIDATE SEARCH GOAL (weight the ranking toward this): {goal}";

pub const NO_SEARCH_GOAL: &str = "No explicit search goal: rank by overall fit.";

/// System prompt for salary prediction.
pub const SALARY_SYSTEM: &str = "You are a compensation analyst. \
    You estimate market salary ranges for a specific candidate and role. \
    You MUST respond with a single JSON object only. \
    Do NOT include any text outside the JSON object.";

/// Salary prediction prompt template.
/// Replace: {profile_json}, {job_json}, {calibration}
pub const SALARY_PROMPT_TEMPLATE: &str = r#"Estimate the salary this candidate could command for this role.

CANDIDATE PROFILE:
{profile_json}

JOB:
{job_json}

Return a JSON object with this EXACT schema:
{
  "minSalary": 110,
  "medianSalary": 125,
  "maxSalary": 140,
  "currency": "USD",
  "percentile": 55,
  "confidence": 60,
  "factors": ["Location premium", "Kubernetes demand"]
}

Salary figures are annual, in THOUSANDS. `percentile` is where the candidate sits in the
market for this role. {calibration}"#;

/// System prompt for success probability.
pub const SUCCESS_SYSTEM: &str = "You are a hiring-outcome analyst. \
    You estimate how likely a candidate is to progress through a specific hiring process. \
    You MUST respond with a single JSON object only. \
    Do NOT include any text outside the JSON object.";

/// Success probability prompt template.
/// Replace: {profile_json}, {job_json}, {calibration}
pub const SUCCESS_PROMPT_TEMPLATE: &str = r#"Estimate this candidate's chances for this role.

CANDIDATE PROFILE:
{profile_json}

JOB:
{job_json}

Return a JSON object with this EXACT schema:
{
  "overallProbability": 58,
  "interviewProbability": 65,
  "offerProbability": 35,
  "skillMatch": 70,
  "experienceMatch": 55,
  "strengths": ["Production Python at scale"],
  "risks": ["No Kubernetes experience listed"]
}

{calibration}"#;
