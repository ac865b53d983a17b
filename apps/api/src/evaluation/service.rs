//! EvaluationService: three LLM calls per answer (scores, feedback, fraud) plus the
//! deterministic weighting. Every LLM failure degrades to a fallback; nothing here
//! aborts the evaluation job.

use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::evaluation::dimensions::{weighted_score, DimensionalScore, ScoringWeights};
use crate::evaluation::fraud::{heuristic_check, FraudCheck};
use crate::evaluation::prompts::*;
use crate::evaluation::QuestionEvaluation;
use crate::llm_client::prompts::{fill_template, json_system, truncate_chars};
use crate::llm_client::LlmClient;

/// Everything needed to score one answered question.
#[derive(Debug, Clone)]
pub struct AnswerInput<'a> {
    pub question_id: Uuid,
    pub question: &'a str,
    pub question_type: &'a str,
    pub expected_keywords: &'a [String],
    pub answer: &'a str,
    pub code_context: &'a str,
    pub project_summary: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Feedback {
    #[serde(default = "default_feedback")]
    pub feedback: String,
    #[serde(default = "default_strengths")]
    pub strengths: Vec<String>,
    #[serde(default = "default_weaknesses")]
    pub weaknesses: Vec<String>,
}

fn default_feedback() -> String {
    "Good effort".to_string()
}

fn default_strengths() -> Vec<String> {
    vec!["Shows understanding".to_string()]
}

fn default_weaknesses() -> Vec<String> {
    vec!["Could provide more detail".to_string()]
}

impl Feedback {
    /// Used when the feedback call fails outright.
    pub fn fallback() -> Self {
        Self {
            feedback: "Good effort on this question.".to_string(),
            strengths: vec!["Shows understanding".to_string()],
            weaknesses: vec!["Could elaborate more".to_string()],
        }
    }
}

#[derive(Clone)]
pub struct EvaluationService {
    llm: LlmClient,
    weights: ScoringWeights,
}

impl EvaluationService {
    pub fn new(llm: LlmClient, weights: ScoringWeights) -> Self {
        Self { llm, weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Scores, explains and fraud-checks a single answer.
    pub async fn evaluate(&self, input: &AnswerInput<'_>) -> QuestionEvaluation {
        let scores = self.evaluate_answer(input).await;
        let feedback = self.generate_feedback(input.question, input.answer, &scores).await;
        let fraud = self
            .detect_fraud(input.answer, input.code_context, input.question)
            .await;

        QuestionEvaluation {
            question_id: input.question_id,
            weighted_score: weighted_score(&scores, &self.weights),
            scores,
            feedback: feedback.feedback,
            strengths: feedback.strengths,
            weaknesses: feedback.weaknesses,
            fraud_flag: fraud.flagged,
            fraud_reason: fraud.flagged.then_some(fraud.reason),
        }
    }

    /// Dimensional scores from the LLM; neutral 5.0 across the board on any failure.
    pub async fn evaluate_answer(&self, input: &AnswerInput<'_>) -> DimensionalScore {
        let keywords = input.expected_keywords.join(", ");
        let prompt = fill_template(
            SCORING_PROMPT_TEMPLATE,
            &[
                ("question_type", input.question_type),
                ("question", input.question),
                ("expected_keywords", keywords.as_str()),
                ("answer", input.answer),
                (
                    "code_context",
                    truncate_chars(input.code_context, SCORING_CODE_CONTEXT_CHARS),
                ),
                (
                    "project_summary",
                    truncate_chars(input.project_summary, SCORING_SUMMARY_CHARS),
                ),
            ],
        );

        match self
            .llm
            .call_json::<DimensionalScore>(
                &prompt,
                &json_system(SCORING_PERSONA),
                SCORING_TEMPERATURE,
            )
            .await
        {
            Ok(scores) => scores,
            Err(e) => {
                error!(
                    "Error evaluating answer for question {}: {e}; using neutral scores",
                    input.question_id
                );
                DimensionalScore::neutral()
            }
        }
    }

    pub async fn generate_feedback(
        &self,
        question: &str,
        answer: &str,
        scores: &DimensionalScore,
    ) -> Feedback {
        let dimensions = [
            ("concept_understanding", scores.concept_understanding.to_string()),
            ("technical_depth", scores.technical_depth.to_string()),
            ("accuracy", scores.accuracy.to_string()),
            ("communication", scores.communication.to_string()),
            ("relevance", scores.relevance.to_string()),
        ];
        let mut values = vec![("question", question), ("answer", answer)];
        values.extend(dimensions.iter().map(|(name, value)| (*name, value.as_str())));
        let prompt = fill_template(FEEDBACK_PROMPT_TEMPLATE, &values);

        match self
            .llm
            .call_json::<Feedback>(
                &prompt,
                &json_system(FEEDBACK_PERSONA),
                FEEDBACK_TEMPERATURE,
            )
            .await
        {
            Ok(feedback) => feedback,
            Err(e) => {
                error!("Error generating feedback: {e}");
                Feedback::fallback()
            }
        }
    }

    /// Heuristics first; the LLM classifier only runs when none trip.
    pub async fn detect_fraud(&self, answer: &str, code_context: &str, question: &str) -> FraudCheck {
        if let Some(check) = heuristic_check(answer) {
            return check;
        }

        let prompt = fill_template(
            FRAUD_PROMPT_TEMPLATE,
            &[
                ("question", question),
                ("answer", answer),
                ("code_context", truncate_chars(code_context, FRAUD_CODE_CONTEXT_CHARS)),
            ],
        );

        match self
            .llm
            .call_json::<FraudCheck>(&prompt, &json_system(FRAUD_PERSONA), FRAUD_TEMPERATURE)
            .await
        {
            Ok(check) => check,
            Err(e) => {
                warn!("Fraud classifier unavailable, treating answer as clean: {e}");
                FraudCheck::clear()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock_message_body;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ANSWER: &str = "The ingest worker batches rows and flushes them every five seconds \
                          so the database sees fewer round trips.";

    fn service_for(server: &MockServer) -> EvaluationService {
        let llm = LlmClient::new("test-key".to_string())
            .unwrap()
            .with_base_url(server.uri())
            .with_retry_base_delay(Duration::from_millis(1));
        EvaluationService::new(llm, ScoringWeights::default())
    }

    fn input<'a>(keywords: &'a [String], answer: &'a str) -> AnswerInput<'a> {
        AnswerInput {
            question_id: Uuid::new_v4(),
            question: "Why does the ingest worker batch writes?",
            question_type: "why",
            expected_keywords: keywords,
            answer,
            code_context: "fn flush(&mut self) { ... }",
            project_summary: "Repository: example/ingest",
        }
    }

    async fn reply_when(server: &MockServer, marker: &str, text: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_string_contains(marker))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_message_body(text)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_evaluate_combines_all_three_calls() {
        let server = MockServer::start().await;
        reply_when(
            &server,
            "Score the answer on these dimensions",
            r#"{"concept_understanding": 8, "technical_depth": 6, "accuracy": 4, "communication": 7, "relevance": 9}"#,
        )
        .await;
        reply_when(
            &server,
            "provide constructive feedback",
            r#"{"feedback": "Solid.", "strengths": ["batching"], "weaknesses": ["no metrics"]}"#,
        )
        .await;
        reply_when(
            &server,
            "Detect if this answer seems fraudulent",
            r#"{"is_fraud": false, "reason": ""}"#,
        )
        .await;

        let keywords = vec!["batching".to_string()];
        let result = service_for(&server).evaluate(&input(&keywords, ANSWER)).await;

        assert_eq!(result.scores.concept_understanding, 8.0);
        assert!((result.weighted_score - 77.0).abs() < 1e-9);
        assert_eq!(result.feedback, "Solid.");
        assert_eq!(result.strengths, vec!["batching"]);
        assert!(!result.fraud_flag);
        assert!(result.fraud_reason.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_scores_fall_back_to_neutral() {
        let server = MockServer::start().await;
        reply_when(&server, "Score the answer", "I think this answer is pretty good!").await;

        let keywords: Vec<String> = vec![];
        let scores = service_for(&server)
            .evaluate_answer(&input(&keywords, ANSWER))
            .await;
        assert_eq!(scores, DimensionalScore::neutral());
    }

    #[tokio::test]
    async fn test_llm_outage_falls_back_everywhere() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let keywords: Vec<String> = vec![];
        let result = service_for(&server).evaluate(&input(&keywords, ANSWER)).await;
        assert_eq!(result.scores, DimensionalScore::neutral());
        assert!((result.weighted_score - 55.0).abs() < 1e-9);
        assert_eq!(result.feedback, Feedback::fallback().feedback);
        assert!(!result.fraud_flag);
    }

    #[tokio::test]
    async fn test_feedback_missing_fields_use_defaults() {
        let server = MockServer::start().await;
        reply_when(&server, "provide constructive feedback", r#"{"feedback": "Clear answer."}"#)
            .await;

        let feedback = service_for(&server)
            .generate_feedback("q", "a", &DimensionalScore::neutral())
            .await;
        assert_eq!(feedback.feedback, "Clear answer.");
        assert_eq!(feedback.strengths, vec!["Shows understanding"]);
        assert_eq!(feedback.weaknesses, vec!["Could provide more detail"]);
    }

    #[tokio::test]
    async fn test_heuristic_fraud_skips_llm() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Detect if this answer seems fraudulent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_message_body("{}")))
            .expect(0)
            .mount(&server)
            .await;

        let check = service_for(&server)
            .detect_fraud("I found online a tutorial for this part", "", "q")
            .await;
        assert!(check.flagged);
        assert_eq!(check.reason, "Generic response detected: 'found online'");
    }

    #[tokio::test]
    async fn test_llm_fraud_signal_is_recorded_but_scoring_continues() {
        let server = MockServer::start().await;
        reply_when(
            &server,
            "Score the answer",
            r#"{"concept_understanding": 9, "technical_depth": 9, "accuracy": 9, "communication": 9, "relevance": 9}"#,
        )
        .await;
        reply_when(&server, "provide constructive feedback", r#"{}"#).await;
        reply_when(
            &server,
            "Detect if this answer seems fraudulent",
            r#"{"is_fraud": true, "reason": "Describes a different project"}"#,
        )
        .await;

        let keywords: Vec<String> = vec![];
        let result = service_for(&server).evaluate(&input(&keywords, ANSWER)).await;
        assert!(result.fraud_flag);
        assert_eq!(
            result.fraud_reason.as_deref(),
            Some("Describes a different project")
        );
        assert!((result.weighted_score - 99.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_feedback_prompt_keeps_placeholder_text_in_answer() {
        let server = MockServer::start().await;
        reply_when(
            &server,
            r#"Answer: print(f'{accuracy}') and {code_context}"#,
            r#"{"feedback": "Saw the f-string.", "strengths": [], "weaknesses": []}"#,
        )
        .await;

        let feedback = service_for(&server)
            .generate_feedback(
                "How do you log accuracy?",
                "print(f'{accuracy}') and {code_context}",
                &DimensionalScore::neutral(),
            )
            .await;
        assert_eq!(feedback.feedback, "Saw the f-string.");
    }

    #[tokio::test]
    async fn test_scoring_prompt_keeps_placeholder_text_in_answer() {
        let server = MockServer::start().await;
        reply_when(
            &server,
            "uses {project_summary} as a literal",
            r#"{"concept_understanding": 7, "technical_depth": 7, "accuracy": 7, "communication": 7, "relevance": 7}"#,
        )
        .await;

        let keywords: Vec<String> = vec![];
        let answer = "The template uses {project_summary} as a literal token.";
        let scores = service_for(&server)
            .evaluate_answer(&input(&keywords, answer))
            .await;
        assert_eq!(scores.accuracy, 7.0);
    }
}
