pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::candidates::handlers as candidates;
use crate::profiles::handlers as profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Role catalog
        .route("/api/v1/roles", get(profiles::handle_list_roles))
        .route(
            "/api/v1/roles/:role_type/skills",
            get(profiles::handle_role_skills),
        )
        // Candidates
        .route(
            "/api/v1/candidates",
            post(candidates::handle_submit_candidate).get(candidates::handle_list_candidates),
        )
        .route(
            "/api/v1/candidates/:id",
            delete(candidates::handle_delete_candidate),
        )
        .route(
            "/api/v1/candidates/:id/status",
            get(candidates::handle_candidate_status),
        )
        .route(
            "/api/v1/candidates/:id/questions",
            get(candidates::handle_list_questions),
        )
        .route(
            "/api/v1/candidates/:id/answers",
            post(candidates::handle_submit_answers),
        )
        .route(
            "/api/v1/candidates/:id/report",
            get(candidates::handle_get_report),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::evaluation::dimensions::ScoringWeights;
    use crate::evaluation::service::EvaluationService;
    use crate::llm_client::LlmClient;
    use crate::pipeline::jobs::JobTracker;
    use crate::rag::store::memory::MemoryChunkStore;
    use crate::repository::github::GithubClient;

    /// State whose database and Redis are never reached by the routes under test.
    fn test_state() -> AppState {
        let config = Config {
            database_url: "postgres://assessor@127.0.0.1:1/assessor".to_string(),
            redis_url: "redis://127.0.0.1:1/".to_string(),
            anthropic_api_key: "test-key".to_string(),
            anthropic_base_url: None,
            github_token: None,
            github_api_url: "http://127.0.0.1:1".to_string(),
            repos_dir: PathBuf::from("target/test-repos"),
            min_questions: 6,
            max_questions: 10,
            weights: ScoringWeights::default(),
            storage: None,
            port: 0,
            rust_log: "info".to_string(),
        };
        let llm = LlmClient::new(config.anthropic_api_key.clone()).unwrap();
        AppState {
            db: PgPoolOptions::new().connect_lazy(&config.database_url).unwrap(),
            jobs: JobTracker::new(redis::Client::open(config.redis_url.clone()).unwrap()),
            s3: None,
            evaluator: EvaluationService::new(llm.clone(), config.weights),
            llm,
            github: GithubClient::new(config.github_api_url.clone(), None).unwrap(),
            chunk_store: Arc::new(MemoryChunkStore::default()),
            config,
        }
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "assessor");
    }

    #[tokio::test]
    async fn test_list_roles() {
        let (status, body) = send(get("/api/v1/roles")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["roles"],
            json!(["Frontend", "Backend", "ML", "DevOps", "FullStack"])
        );
    }

    #[tokio::test]
    async fn test_role_skills() {
        let (status, body) = send(get("/api/v1/roles/Backend/skills")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role_type"], "Backend");
        assert!(!body["required_skills"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_role_is_404() {
        let (status, body) = send(get("/api/v1/roles/Designer/skills")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_email_before_touching_storage() {
        let (status, body) = send(post_json(
            "/api/v1/candidates",
            json!({
                "name": "Ada",
                "email": "not-an-email",
                "github_url": "https://github.com/ada/engine",
                "role_type": "Backend"
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Invalid email format");
    }

    #[tokio::test]
    async fn test_submit_rejects_unknown_role() {
        let (status, body) = send(post_json(
            "/api/v1/candidates",
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "github_url": "https://github.com/ada/engine",
                "role_type": "Designer"
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_empty_answers_rejected() {
        let uri = format!("/api/v1/candidates/{}/answers", Uuid::new_v4());
        let (status, body) = send(post_json(&uri, json!({ "answers": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "answers must not be empty");
    }

    #[tokio::test]
    async fn test_malformed_candidate_id_rejected() {
        let (status, _) = send(get("/api/v1/candidates/not-a-uuid/status")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
