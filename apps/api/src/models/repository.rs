use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RepositoryRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub repo_name: String,
    pub repo_url: String,
    pub owner: String,
    pub description: Option<String>,
    /// Language → bytes, as reported by GitHub.
    pub languages: Value,
    pub tech_stack: Vec<String>,
    pub file_count: i32,
    pub project_summary: String,
    pub purpose: String,
    pub skill_match: f64,
    pub stars: i32,
    pub forks: i32,
    pub last_commit: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
