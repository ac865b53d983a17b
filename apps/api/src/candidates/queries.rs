use sqlx::PgPool;
use uuid::Uuid;

use crate::models::candidate::{CandidateProgressRow, CandidateRow};
use crate::models::evaluation::EvaluationRow;
use crate::models::question::QuestionRow;
use crate::models::repository::RepositoryRow;

const PROGRESS_SELECT: &str = r#"
    SELECT c.id, c.name, c.email, c.github_url, c.role_type, c.created_at,
           EXISTS (SELECT 1 FROM questions q WHERE q.candidate_id = c.id) AS has_questions,
           (e.id IS NOT NULL) AS has_evaluation,
           e.overall_score
    FROM candidates c
    LEFT JOIN evaluations e ON e.candidate_id = c.id
"#;

pub async fn insert_candidate(
    pool: &PgPool,
    name: &str,
    email: &str,
    github_url: &str,
    role_type: &str,
) -> Result<CandidateRow, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates (id, name, email, github_url, role_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(github_url)
    .bind(role_type)
    .fetch_one(pool)
    .await
}

pub async fn find_candidate(pool: &PgPool, id: Uuid) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_progress_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<CandidateProgressRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateProgressRow>(&format!("{PROGRESS_SELECT} WHERE c.email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_progress(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<CandidateProgressRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateProgressRow>(&format!("{PROGRESS_SELECT} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Newest first.
pub async fn list_progress(pool: &PgPool) -> Result<Vec<CandidateProgressRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateProgressRow>(&format!("{PROGRESS_SELECT} ORDER BY c.created_at DESC"))
        .fetch_all(pool)
        .await
}

/// Child rows go with it via `ON DELETE CASCADE`. Returns whether a row was removed.
pub async fn delete_candidate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_repository(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Option<RepositoryRow>, sqlx::Error> {
    sqlx::query_as::<_, RepositoryRow>("SELECT * FROM repositories WHERE candidate_id = $1")
        .bind(candidate_id)
        .fetch_optional(pool)
        .await
}

/// In generation order.
pub async fn list_questions(pool: &PgPool, candidate_id: Uuid) -> Result<Vec<QuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestionRow>(
        "SELECT * FROM questions WHERE candidate_id = $1 ORDER BY position",
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

/// Stores an answer only when the question belongs to the candidate.
pub async fn save_answer(
    pool: &PgPool,
    candidate_id: Uuid,
    question_id: Uuid,
    answer_text: &str,
    time_taken_secs: Option<i32>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE questions
        SET answer_text = $3, answered_at = now(), time_taken_secs = $4
        WHERE id = $1 AND candidate_id = $2
        "#,
    )
    .bind(question_id)
    .bind(candidate_id)
    .bind(answer_text)
    .bind(time_taken_secs)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_evaluation(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Option<EvaluationRow>, sqlx::Error> {
    sqlx::query_as::<_, EvaluationRow>("SELECT * FROM evaluations WHERE candidate_id = $1")
        .bind(candidate_id)
        .fetch_optional(pool)
        .await
}
