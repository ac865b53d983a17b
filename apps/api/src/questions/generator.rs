//! Interview question generation: one LLM call per candidate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::{fill_template, json_system, truncate_chars};
use crate::llm_client::{LlmClient, LlmError};
use crate::questions::prompts::*;

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("question generation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM returned no questions")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum QuestionType {
    Why,
    What,
    How,
    Where,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Why => "why",
            QuestionType::What => "what",
            QuestionType::How => "how",
            QuestionType::Where => "where",
        }
    }
}

impl TryFrom<String> for QuestionType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "why" => Ok(QuestionType::Why),
            "what" => Ok(QuestionType::What),
            "how" => Ok(QuestionType::How),
            "where" => Ok(QuestionType::Where),
            other => Err(format!("unknown question type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub expected_keywords: Vec<String>,
}

type RawQuestion = serde_json::Map<String, serde_json::Value>;

/// The model sometimes returns the array without the wrapper object. Elements stay
/// raw so one malformed question does not sink the rest.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionsPayload {
    Wrapped { questions: Vec<RawQuestion> },
    Bare(Vec<RawQuestion>),
}

impl QuestionsPayload {
    fn into_questions(self) -> Vec<GeneratedQuestion> {
        let raw = match self {
            QuestionsPayload::Wrapped { questions } | QuestionsPayload::Bare(questions) => questions,
        };
        raw.into_iter()
            .enumerate()
            .filter_map(|(index, fields)| {
                match serde_json::from_value(serde_json::Value::Object(fields)) {
                    Ok(question) => Some(question),
                    Err(e) => {
                        warn!("Dropping generated question {index}: {e}");
                        None
                    }
                }
            })
            .collect()
    }
}

pub struct QuestionRequest<'a> {
    pub role_type: &'a str,
    pub required_skills: &'a [&'a str],
    pub project_summary: &'a str,
    pub purpose: &'a str,
    pub code_context: &'a str,
    pub min_questions: usize,
    pub max_questions: usize,
}

fn build_prompt(request: &QuestionRequest<'_>) -> String {
    let count = request.max_questions.to_string();
    let skills = request.required_skills.join(", ");
    fill_template(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("count", count.as_str()),
            ("role_type", request.role_type),
            ("required_skills", skills.as_str()),
            (
                "project_summary",
                truncate_chars(request.project_summary, QUESTION_SUMMARY_CHARS),
            ),
            ("purpose", truncate_chars(request.purpose, QUESTION_SUMMARY_CHARS)),
            (
                "code_context",
                truncate_chars(request.code_context, QUESTION_CODE_CONTEXT_CHARS),
            ),
        ],
    )
}

/// Malformed and blank questions are discarded; the rest are truncated to `max_questions`.
pub async fn generate_questions(
    llm: &LlmClient,
    request: &QuestionRequest<'_>,
) -> Result<Vec<GeneratedQuestion>, QuestionError> {
    let payload: QuestionsPayload = llm
        .call_json(
            &build_prompt(request),
            &json_system(QUESTION_PERSONA),
            QUESTION_TEMPERATURE,
        )
        .await?;

    let mut questions: Vec<GeneratedQuestion> = payload
        .into_questions()
        .into_iter()
        .filter(|q| !q.question_text.trim().is_empty())
        .collect();

    if questions.is_empty() {
        return Err(QuestionError::Empty);
    }
    questions.truncate(request.max_questions);
    if questions.len() < request.min_questions {
        warn!(
            "Generated only {} questions for {} role (minimum {})",
            questions.len(),
            request.role_type,
            request.min_questions
        );
    }

    info!("Generated {} questions for {} role", questions.len(), request.role_type);
    Ok(questions)
}
