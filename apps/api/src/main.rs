mod candidates;
mod config;
mod db;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod pipeline;
mod profiles;
mod questions;
mod rag;
mod report;
mod repository;
mod routes;
mod state;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageConfig};
use crate::db::create_pool;
use crate::evaluation::service::EvaluationService;
use crate::llm_client::LlmClient;
use crate::pipeline::jobs::JobTracker;
use crate::rag::store::PgChunkStore;
use crate::repository::github::GithubClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting assessor v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis job tracker
    let redis = redis::Client::open(config.redis_url.clone()).context("opening Redis client")?;
    let jobs = JobTracker::new(redis);
    info!("Redis job tracker initialized");

    // Initialize S3 / MinIO for report uploads, when configured
    let s3 = match &config.storage {
        Some(storage) => {
            let client = build_s3_client(storage).await;
            info!("S3 client initialized (bucket: {})", storage.bucket);
            Some(client)
        }
        None => {
            info!("Object storage not configured; reports are kept in the database only");
            None
        }
    };

    // Initialize LLM client and evaluator
    let mut llm = LlmClient::new(config.anthropic_api_key.clone())?;
    if let Some(base_url) = &config.anthropic_base_url {
        llm = llm.with_base_url(base_url.as_str());
    }
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let evaluator = EvaluationService::new(llm.clone(), config.weights);

    let github = GithubClient::new(config.github_api_url.clone(), config.github_token.clone())?;
    if config.github_token.is_none() {
        info!("No GITHUB_TOKEN set; repository metadata will be derived from URLs");
    }

    let chunk_store = Arc::new(PgChunkStore::new(db.clone()));

    // Build app state
    let state = AppState {
        db,
        jobs,
        s3,
        llm,
        evaluator,
        github,
        chunk_store,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(storage: &StorageConfig) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &storage.access_key_id,
        &storage.secret_access_key,
        None,
        None,
        "assessor-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(storage.region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&storage.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
