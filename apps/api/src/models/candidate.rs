use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub github_url: String,
    pub role_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A candidate plus the flags its pipeline status is derived from.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateProgressRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub github_url: String,
    pub role_type: String,
    pub created_at: DateTime<Utc>,
    pub has_questions: bool,
    pub has_evaluation: bool,
    pub overall_score: Option<f64>,
}
