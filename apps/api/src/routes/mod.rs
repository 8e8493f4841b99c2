pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::matching::handlers as matching;
use crate::recommendations::handlers as recommendations;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Local ATS engine
        .route("/api/v1/match/keywords", post(matching::handle_extract_keywords))
        .route("/api/v1/match/ats-score", post(matching::handle_ats_score))
        .route("/api/v1/match/quick-score", post(matching::handle_quick_score))
        // Completion-backed ranking and estimates
        .route(
            "/api/v1/recommendations",
            post(recommendations::handle_recommendations),
        )
        .route(
            "/api/v1/predictions/salary",
            post(recommendations::handle_salary_prediction),
        )
        .route(
            "/api/v1/predictions/success",
            post(recommendations::handle_success_probability),
        )
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::testing::ScriptedCompletion;
    use crate::llm_client::CompletionSettings;
    use crate::matching::vocabulary::MatchVocabulary;

    fn router_with(completion: Arc<ScriptedCompletion>) -> Router {
        build_router(AppState {
            completion,
            settings: CompletionSettings::default(),
            vocabulary: Arc::new(MatchVocabulary::default()),
        })
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn profile() -> Value {
        json!({
            "skills": ["Rust", "PostgreSQL", "Docker"],
            "experience": [{
                "title": "Backend Engineer",
                "company": "Initech",
                "description": "Built Rust services on PostgreSQL"
            }],
            "education": [{"degree": "BSc", "field": "Computer Science", "institution": "State U"}],
            "yearsOfExperience": 6
        })
    }

    fn job(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "company": "Acme",
            "location": "Remote",
            "description": "Own Rust services backed by PostgreSQL.",
            "requirements": "5+ years of Rust\nPostgreSQL\nKubernetes"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let router = router_with(Arc::new(ScriptedCompletion::replying("")));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["service"], "matcher");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let router = router_with(Arc::new(ScriptedCompletion::replying("")));
        let (status, body) = post_json(router, "/api/v1/nope", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_keywords_endpoint() {
        let router = router_with(Arc::new(ScriptedCompletion::replying("")));
        let (status, body) =
            post_json(router, "/api/v1/match/keywords", json!({"job": job("1", "Rust Engineer")}))
                .await;
        assert_eq!(status, StatusCode::OK);
        let phrases: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|k| k["phrase"].as_str())
            .collect();
        assert!(phrases.contains(&"rust"));
    }

    #[tokio::test]
    async fn test_ats_score_with_supplied_keywords() {
        let router = router_with(Arc::new(ScriptedCompletion::replying("")));
        let (status, body) = post_json(
            router,
            "/api/v1/match/ats-score",
            json!({
                "profile": profile(),
                "job": job("1", "Backend Engineer"),
                "mustHaveKeywords": ["Rust", {"phrase": "Postgres", "equivalents": ["PostgreSQL"]}]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["breakdown"]["keywordDensity"], 100);
        let score = body["atsScore"].as_u64().unwrap();
        assert!(score <= 100);
    }

    #[tokio::test]
    async fn test_quick_score_sorted_descending() {
        let router = router_with(Arc::new(ScriptedCompletion::replying("")));
        let unrelated = json!({"id": "2", "title": "Pastry Chef", "description": "Bake bread."});
        let (status, body) = post_json(
            router,
            "/api/v1/match/quick-score",
            json!({"profile": profile(), "jobs": [unrelated, job("1", "Rust Engineer")]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["jobId"], "1");
        assert!(body[0]["score"].as_u64() >= body[1]["score"].as_u64());
    }

    #[tokio::test]
    async fn test_recommendations_empty_jobs_skip_completion() {
        let completion = Arc::new(ScriptedCompletion::replying("[]"));
        let router = router_with(completion.clone());
        let (status, body) = post_json(
            router,
            "/api/v1/recommendations",
            json!({"profile": profile(), "jobs": []}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        assert!(completion.requests().is_empty());
    }

    #[tokio::test]
    async fn test_recommendations_zero_limit_is_validation_error() {
        let router = router_with(Arc::new(ScriptedCompletion::replying("[]")));
        let (status, body) = post_json(
            router,
            "/api/v1/recommendations",
            json!({"profile": profile(), "jobs": [job("1", "Rust Engineer")], "limit": 0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_recommendations_merge_ai_and_ats() {
        let completion = Arc::new(ScriptedCompletion::replying(
            r#"[{"jobId": 1, "matchScore": 77, "reasons": ["Rust depth"]}]"#,
        ));
        let router = router_with(completion.clone());
        let (status, body) = post_json(
            router,
            "/api/v1/recommendations",
            json!({"profile": profile(), "jobs": [job("1", "Rust Engineer")], "callerId": "u-42"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["job"]["id"], "1");
        assert_eq!(body[0]["matchScore"], 77);
        assert_eq!(body[0]["whyMatch"], "Your profile aligns with this role: Rust depth.");
        assert!(body[0]["atsScore"].is_u64());
        assert_eq!(completion.requests()[0].caller_id, "u-42");
    }

    #[tokio::test]
    async fn test_recommendations_completion_failure_is_500() {
        let router = router_with(Arc::new(ScriptedCompletion::failing(503)));
        let (status, body) = post_json(
            router,
            "/api/v1/recommendations",
            json!({"profile": profile(), "jobs": [job("1", "Rust Engineer")]}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_salary_prediction_generates_caller_id() {
        let completion = Arc::new(ScriptedCompletion::replying(
            r#"{"minSalary": 140, "medianSalary": 160, "maxSalary": 180}"#,
        ));
        let router = router_with(completion.clone());
        let (status, body) = post_json(
            router,
            "/api/v1/predictions/salary",
            json!({"profile": profile(), "job": job("1", "Rust Engineer")}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["medianSalary"], 160.0);
        assert_eq!(body["currency"], "USD");
        let caller_id = completion.requests()[0].caller_id.clone();
        assert!(uuid::Uuid::parse_str(&caller_id).is_ok());
    }

    #[tokio::test]
    async fn test_success_probability_fallback_is_neutral() {
        let router = router_with(Arc::new(ScriptedCompletion::replying("no json here")));
        let (status, body) = post_json(
            router,
            "/api/v1/predictions/success",
            json!({"profile": profile(), "job": job("1", "Rust Engineer")}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overallProbability"], 50);
        assert_eq!(body["offerProbability"], 50);
    }
}
