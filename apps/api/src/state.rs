use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::evaluation::service::EvaluationService;
use crate::llm_client::LlmClient;
use crate::pipeline::jobs::JobTracker;
use crate::rag::store::ChunkStore;
use crate::repository::github::GithubClient;

/// Shared application state injected into all route handlers via Axum extractors
/// and cloned into background jobs.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pipeline job status, backed by Redis.
    pub jobs: JobTracker,
    /// Present only when object storage is configured.
    pub s3: Option<S3Client>,
    pub llm: LlmClient,
    pub evaluator: EvaluationService,
    pub github: GithubClient,
    /// Default: `PgChunkStore`.
    pub chunk_store: Arc<dyn ChunkStore>,
    pub config: Config,
}
