use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub position: i32,
    pub question_text: String,
    pub question_type: String,
    pub difficulty: String,
    pub context: String,
    pub expected_keywords: Vec<String>,
    pub answer_text: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
    pub time_taken_secs: Option<i32>,
    pub created_at: DateTime<Utc>,
}
