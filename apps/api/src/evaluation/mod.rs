// Answer scoring and candidate-level aggregation.
// LLM calls go through llm_client; the weighting and the hiring ladder are pure functions.

pub mod dimensions;
pub mod fraud;
pub mod overall;
pub mod prompts;
pub mod service;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluation::dimensions::DimensionalScore;

/// Outcome of scoring one answered question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub question_id: Uuid,
    pub scores: DimensionalScore,
    /// 0 – 100
    pub weighted_score: f64,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub fraud_flag: bool,
    pub fraud_reason: Option<String>,
}
