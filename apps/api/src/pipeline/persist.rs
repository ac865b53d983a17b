//! Writes performed by the background jobs.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::evaluation::overall::{HireRecommendation, OverallScores};
use crate::evaluation::QuestionEvaluation;
use crate::questions::generator::GeneratedQuestion;
use crate::repository::analysis::ProjectAnalysis;
use crate::repository::github::RepositoryInfo;

pub struct RepositoryRecord<'a> {
    pub info: &'a RepositoryInfo,
    pub analysis: &'a ProjectAnalysis,
    pub tech_stack: &'a [String],
    pub project_summary: &'a str,
    pub purpose: &'a str,
    pub skill_match: f64,
}

/// One repository row per candidate; reprocessing overwrites it.
pub async fn upsert_repository(
    pool: &PgPool,
    candidate_id: Uuid,
    record: RepositoryRecord<'_>,
) -> Result<()> {
    let RepositoryRecord {
        info,
        analysis,
        tech_stack,
        project_summary,
        purpose,
        skill_match,
    } = record;

    sqlx::query(
        r#"
        INSERT INTO repositories
            (id, candidate_id, repo_name, repo_url, owner, description, languages, tech_stack,
             file_count, project_summary, purpose, skill_match, stars, forks, last_commit)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (candidate_id) DO UPDATE SET
            repo_name = EXCLUDED.repo_name,
            repo_url = EXCLUDED.repo_url,
            owner = EXCLUDED.owner,
            description = EXCLUDED.description,
            languages = EXCLUDED.languages,
            tech_stack = EXCLUDED.tech_stack,
            file_count = EXCLUDED.file_count,
            project_summary = EXCLUDED.project_summary,
            purpose = EXCLUDED.purpose,
            skill_match = EXCLUDED.skill_match,
            stars = EXCLUDED.stars,
            forks = EXCLUDED.forks,
            last_commit = EXCLUDED.last_commit
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(candidate_id)
    .bind(&info.repo_name)
    .bind(&info.repo_url)
    .bind(&info.owner)
    .bind(info.description.as_deref())
    .bind(serde_json::to_value(&info.languages)?)
    .bind(tech_stack)
    .bind(i32::try_from(analysis.total_files).unwrap_or(i32::MAX))
    .bind(project_summary)
    .bind(purpose)
    .bind(skill_match)
    .bind(i32::try_from(info.stars).unwrap_or(i32::MAX))
    .bind(i32::try_from(info.forks).unwrap_or(i32::MAX))
    .bind(info.last_commit)
    .execute(pool)
    .await?;
    Ok(())
}

/// Replaces any previously generated questions, keeping the generation order.
pub async fn replace_questions(
    pool: &PgPool,
    candidate_id: Uuid,
    questions: &[GeneratedQuestion],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM questions WHERE candidate_id = $1")
        .bind(candidate_id)
        .execute(&mut *tx)
        .await?;

    for (position, q) in questions.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO questions
                (id, candidate_id, position, question_text, question_type, difficulty, context, expected_keywords)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(position as i32)
        .bind(&q.question_text)
        .bind(q.question_type.as_str())
        .bind(q.difficulty.as_str())
        .bind(&q.context)
        .bind(&q.expected_keywords)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

const UPSERT_SCORE_SQL: &str = r#"
    INSERT INTO question_scores
        (id, question_id, concept_understanding, technical_depth, accuracy, communication,
         relevance, weighted_score, feedback, strengths, weaknesses, fraud_flag, fraud_reason)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
    ON CONFLICT (question_id) DO UPDATE SET
        concept_understanding = EXCLUDED.concept_understanding,
        technical_depth = EXCLUDED.technical_depth,
        accuracy = EXCLUDED.accuracy,
        communication = EXCLUDED.communication,
        relevance = EXCLUDED.relevance,
        weighted_score = EXCLUDED.weighted_score,
        feedback = EXCLUDED.feedback,
        strengths = EXCLUDED.strengths,
        weaknesses = EXCLUDED.weaknesses,
        fraud_flag = EXCLUDED.fraud_flag,
        fraud_reason = EXCLUDED.fraud_reason
"#;

/// Swaps a candidate's question scores for `evaluations` in one transaction.
/// Overlapping evaluation runs serialize on the rows and the last writer wins.
pub async fn replace_scores(
    pool: &PgPool,
    candidate_id: Uuid,
    evaluations: &[QuestionEvaluation],
) -> Result<u64> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query(
        r#"
        DELETE FROM question_scores
        WHERE question_id IN (SELECT id FROM questions WHERE candidate_id = $1)
        "#,
    )
    .bind(candidate_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    for evaluation in evaluations {
        let scores = &evaluation.scores;
        sqlx::query(UPSERT_SCORE_SQL)
            .bind(Uuid::new_v4())
            .bind(evaluation.question_id)
            .bind(scores.concept_understanding)
            .bind(scores.technical_depth)
            .bind(scores.accuracy)
            .bind(scores.communication)
            .bind(scores.relevance)
            .bind(evaluation.weighted_score)
            .bind(&evaluation.feedback)
            .bind(&evaluation.strengths)
            .bind(&evaluation.weaknesses)
            .bind(evaluation.fraud_flag)
            .bind(evaluation.fraud_reason.as_deref())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(deleted)
}

pub struct EvaluationRecord<'a> {
    pub scores: &'a OverallScores,
    pub strengths: &'a [String],
    pub weaknesses: &'a [String],
    pub recommendations: &'a str,
    pub hire_recommendation: HireRecommendation,
    pub confidence: f64,
    pub fraud_signals: &'a [String],
    pub report: &'a serde_json::Value,
    pub generated_at: DateTime<Utc>,
}

/// One evaluation per candidate; re-evaluation replaces the previous one.
pub async fn upsert_evaluation(
    pool: &PgPool,
    candidate_id: Uuid,
    record: EvaluationRecord<'_>,
) -> Result<()> {
    let EvaluationRecord {
        scores,
        strengths,
        weaknesses,
        recommendations,
        hire_recommendation,
        confidence,
        fraud_signals,
        report,
        generated_at,
    } = record;

    sqlx::query(
        r#"
        INSERT INTO evaluations
            (id, candidate_id, overall_score, understanding_score, reasoning_score,
             communication_score, logic_score, strengths, weaknesses, recommendations,
             hire_recommendation, confidence, fraud_detected, fraud_signals, report,
             report_key, report_generated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NULL, $16)
        ON CONFLICT (candidate_id) DO UPDATE SET
            overall_score = EXCLUDED.overall_score,
            understanding_score = EXCLUDED.understanding_score,
            reasoning_score = EXCLUDED.reasoning_score,
            communication_score = EXCLUDED.communication_score,
            logic_score = EXCLUDED.logic_score,
            strengths = EXCLUDED.strengths,
            weaknesses = EXCLUDED.weaknesses,
            recommendations = EXCLUDED.recommendations,
            hire_recommendation = EXCLUDED.hire_recommendation,
            confidence = EXCLUDED.confidence,
            fraud_detected = EXCLUDED.fraud_detected,
            fraud_signals = EXCLUDED.fraud_signals,
            report = EXCLUDED.report,
            report_key = NULL,
            report_generated_at = EXCLUDED.report_generated_at,
            updated_at = now()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(candidate_id)
    .bind(scores.overall_score)
    .bind(scores.understanding_score)
    .bind(scores.reasoning_score)
    .bind(scores.communication_score)
    .bind(scores.logic_score)
    .bind(strengths)
    .bind(weaknesses)
    .bind(recommendations)
    .bind(hire_recommendation.as_str())
    .bind(confidence)
    .bind(!fraud_signals.is_empty())
    .bind(fraud_signals)
    .bind(report)
    .bind(generated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_report_key(pool: &PgPool, candidate_id: Uuid, key: &str) -> Result<()> {
    sqlx::query("UPDATE evaluations SET report_key = $2, updated_at = now() WHERE candidate_id = $1")
        .bind(candidate_id)
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}
