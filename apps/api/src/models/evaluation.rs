use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub overall_score: f64,
    pub understanding_score: f64,
    pub reasoning_score: f64,
    pub communication_score: f64,
    pub logic_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: String,
    pub hire_recommendation: String,
    pub confidence: f64,
    pub fraud_detected: bool,
    pub fraud_signals: Vec<String>,
    /// Full JSON report, once generated.
    pub report: Option<Value>,
    pub report_key: Option<String>,
    pub report_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
