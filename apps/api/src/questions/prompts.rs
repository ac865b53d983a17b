// Question generation prompt.

pub const QUESTION_PERSONA: &str =
    "You are a senior technical interviewer who writes questions grounded in a candidate's own code.";

pub const QUESTION_TEMPERATURE: f32 = 0.7;

pub const QUESTION_CODE_CONTEXT_CHARS: usize = 3000;
pub const QUESTION_SUMMARY_CHARS: usize = 1500;

/// Replace `{count}`, `{role_type}`, `{required_skills}`, `{project_summary}`,
/// `{purpose}` and `{code_context}` before sending.
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate {count} interview questions about the candidate's own project.

## Role
{role_type}

## Required Skills
{required_skills}

## Project Summary
{project_summary}

## Project Purpose (from README)
{purpose}

## Code Context
{code_context}

## Rules
- Every question must be answerable only by someone who built this project.
- Mix question types:
  - "why": design decisions and trade-offs
  - "what": components and responsibilities
  - "how": implementation and data flow
  - "where": locating logic in the codebase
- Difficulty is one of "easy", "medium", "hard"; include at least one of each.
- Prefer questions that touch the required skills for the role.
- `context` names the file or feature the question is about.
- `expected_keywords` lists 3-6 terms a strong answer would mention.

Return a JSON object with this EXACT schema:
{
  "questions": [
    {
      "question_text": "Why did you choose X over Y for ...?",
      "question_type": "why",
      "difficulty": "medium",
      "context": "src/worker.rs",
      "expected_keywords": ["keyword"]
    }
  ]
}"#;
