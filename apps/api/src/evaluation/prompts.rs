// Evaluation LLM prompt templates.
// All prompts for the evaluation module are defined here.

pub const SCORING_PERSONA: &str = "You are an expert technical evaluator.";
pub const FEEDBACK_PERSONA: &str = "You are a constructive technical mentor.";
pub const FRAUD_PERSONA: &str = "You are a fraud detection system.";

pub const SCORING_TEMPERATURE: f32 = 0.3;
pub const FEEDBACK_TEMPERATURE: f32 = 0.5;
pub const FRAUD_TEMPERATURE: f32 = 0.2;

/// Character budgets for context embedded in prompts.
pub const SCORING_CODE_CONTEXT_CHARS: usize = 1000;
pub const SCORING_SUMMARY_CHARS: usize = 500;
pub const FRAUD_CODE_CONTEXT_CHARS: usize = 500;

pub const SCORING_PROMPT_TEMPLATE: &str = r#"You are an expert technical interviewer evaluating a candidate's answer.

## Question:
**Type**: {question_type}
**Question**: {question}

## Expected Keywords/Concepts:
{expected_keywords}

## Candidate's Answer:
{answer}

## Project Context:
{code_context}

{project_summary}

## Evaluation Task:
Score the answer on these dimensions (0-10 scale):

1. **Concept Understanding** (0-10): Does the candidate understand the core concepts?
2. **Technical Depth** (0-10): Is the technical explanation detailed and accurate?
3. **Accuracy** (0-10): Is the answer factually correct based on the code?
4. **Communication** (0-10): Is the explanation clear and well-articulated?
5. **Relevance** (0-10): Does the answer address the question directly?

## Scoring Guidelines:
- 0-3: Poor/Incorrect
- 4-6: Adequate/Partial
- 7-8: Good/Complete
- 9-10: Excellent/Exceptional

Return a JSON object with exactly these numeric fields:
{"concept_understanding": n, "technical_depth": n, "accuracy": n, "communication": n, "relevance": n}"#;

pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Based on this Q&A and scores, provide constructive feedback.

Question: {question}
Answer: {answer}

Scores:
- Concept Understanding: {concept_understanding}/10
- Technical Depth: {technical_depth}/10
- Accuracy: {accuracy}/10
- Communication: {communication}/10
- Relevance: {relevance}/10

Provide:
1. Brief feedback (2-3 sentences)
2. Strengths (2-3 points)
3. Weaknesses (2-3 points)

Return a JSON object:
{"feedback": "string", "strengths": ["string"], "weaknesses": ["string"]}"#;

pub const FRAUD_PROMPT_TEMPLATE: &str = r#"Detect if this answer seems fraudulent or inconsistent.

Question: {question}
Answer: {answer}
Code Context: {code_context}

Check for:
1. Answer completely unrelated to project
2. Generic/template responses
3. Contradictions with code
4. Copied text patterns

Return a JSON object:
{"is_fraud": boolean, "reason": "string, empty if not fraud"}"#;
