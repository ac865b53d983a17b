use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::candidates::{derive_status, queries, CandidateStatus, SubmitCandidateRequest};
use crate::errors::AppError;
use crate::models::candidate::CandidateProgressRow;
use crate::pipeline::jobs::{JobStage, JobStatus};
use crate::pipeline::{spawn_evaluate_candidate, spawn_process_repository};
use crate::repository::github::GithubError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitCandidateResponse {
    pub candidate_id: Uuid,
    pub message: &'static str,
    pub status: CandidateStatus,
}

#[derive(Debug, Serialize)]
pub struct CandidateSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub github_url: String,
    pub role_type: String,
    pub created_at: DateTime<Utc>,
    pub status: CandidateStatus,
    pub overall_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CandidateStatusResponse {
    pub candidate_id: Uuid,
    pub status: CandidateStatus,
    pub stage: Option<JobStage>,
    pub error: Option<String>,
    pub total_questions: usize,
    pub answered_questions: usize,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question_id: Uuid,
    pub question_text: String,
    pub question_type: String,
    pub difficulty: String,
    pub context: String,
    pub answered: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: Uuid,
    pub answer_text: String,
    pub time_taken: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<AnswerSubmission>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswersResponse {
    pub message: &'static str,
    pub saved: usize,
    pub ignored: usize,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub candidate_id: Uuid,
    pub report: serde_json::Value,
    pub report_key: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
}

/// Job status is advisory; an unreachable tracker degrades to database-only status.
async fn job_status(state: &AppState, candidate_id: Uuid) -> Option<JobStatus> {
    match state.jobs.get(candidate_id).await {
        Ok(status) => status,
        Err(e) => {
            warn!("Job status unavailable for candidate {candidate_id}: {e}");
            None
        }
    }
}

fn existing_response(row: &CandidateProgressRow, job: Option<&JobStatus>) -> SubmitCandidateResponse {
    SubmitCandidateResponse {
        candidate_id: row.id,
        message: "Candidate already exists. Using existing record.",
        status: derive_status(row.has_questions, row.has_evaluation, job),
    }
}

/// POST /api/v1/candidates
pub async fn handle_submit_candidate(
    State(state): State<AppState>,
    Json(req): Json<SubmitCandidateRequest>,
) -> Result<(StatusCode, Json<SubmitCandidateResponse>), AppError> {
    let req = req.validated()?;

    if let Some(existing) = queries::find_progress_by_email(&state.db, &req.email).await? {
        info!("Candidate with email {} already exists ({})", req.email, existing.id);
        let job = job_status(&state, existing.id).await;
        return Ok((StatusCode::OK, Json(existing_response(&existing, job.as_ref()))));
    }

    match state.github.repository_info(&req.github_url).await {
        Ok(_) => {}
        Err(GithubError::NotFound(_) | GithubError::InvalidUrl(_)) => {
            return Err(AppError::Validation(
                "Invalid or inaccessible GitHub repository".into(),
            ))
        }
        Err(e) => return Err(e.into()),
    }

    let candidate = match queries::insert_candidate(
        &state.db,
        &req.name,
        &req.email,
        &req.github_url,
        &req.role_type,
    )
    .await
    {
        Ok(candidate) => candidate,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            // Concurrent submission with the same email won the insert.
            let existing = queries::find_progress_by_email(&state.db, &req.email)
                .await?
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("candidate vanished after conflict")))?;
            return Ok((StatusCode::OK, Json(existing_response(&existing, None))));
        }
        Err(e) => return Err(e.into()),
    };

    info!("Created candidate {} for {} role", candidate.id, candidate.role_type);
    spawn_process_repository(
        state.clone(),
        candidate.id,
        candidate.github_url.clone(),
        candidate.role_type.clone(),
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitCandidateResponse {
            candidate_id: candidate.id,
            message: "Candidate submitted successfully. Repository analysis in progress.",
            status: CandidateStatus::Processing,
        }),
    ))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateSummary>>, AppError> {
    let rows = queries::list_progress(&state.db).await?;
    let mut candidates = Vec::with_capacity(rows.len());
    for row in rows {
        let job = job_status(&state, row.id).await;
        candidates.push(CandidateSummary {
            status: derive_status(row.has_questions, row.has_evaluation, job.as_ref()),
            id: row.id,
            name: row.name,
            email: row.email,
            github_url: row.github_url,
            role_type: row.role_type,
            created_at: row.created_at,
            overall_score: row.overall_score,
        });
    }
    Ok(Json(candidates))
}

/// DELETE /api/v1/candidates/:id
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !queries::delete_candidate(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Candidate {id} not found")));
    }
    if let Err(e) = state.jobs.clear(id).await {
        warn!("Could not clear job status for candidate {id}: {e}");
    }
    info!("Deleted candidate {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/candidates/:id/status
pub async fn handle_candidate_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateStatusResponse>, AppError> {
    let progress = queries::find_progress(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    let questions = queries::list_questions(&state.db, id).await?;
    let job = job_status(&state, id).await;

    Ok(Json(CandidateStatusResponse {
        candidate_id: id,
        status: derive_status(progress.has_questions, progress.has_evaluation, job.as_ref()),
        stage: job.as_ref().map(|j| j.stage),
        error: job.and_then(|j| j.error),
        total_questions: questions.len(),
        answered_questions: questions.iter().filter(|q| q.answer_text.is_some()).count(),
    }))
}

/// GET /api/v1/candidates/:id/questions
pub async fn handle_list_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<QuestionResponse>>, AppError> {
    let questions = queries::list_questions(&state.db, id).await?;
    if questions.is_empty() {
        return Err(AppError::NotFound(
            "Questions not yet generated or candidate not found".into(),
        ));
    }

    Ok(Json(
        questions
            .into_iter()
            .map(|q| QuestionResponse {
                question_id: q.id,
                answered: q.answer_text.is_some(),
                question_text: q.question_text,
                question_type: q.question_type,
                difficulty: q.difficulty,
                context: q.context,
            })
            .collect(),
    ))
}

/// POST /api/v1/candidates/:id/answers
pub async fn handle_submit_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<(StatusCode, Json<SubmitAnswersResponse>), AppError> {
    if req.answers.is_empty() {
        return Err(AppError::Validation("answers must not be empty".into()));
    }
    if queries::find_candidate(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!("Candidate {id} not found")));
    }

    let mut saved = 0;
    for answer in &req.answers {
        let stored = queries::save_answer(
            &state.db,
            id,
            answer.question_id,
            &answer.answer_text,
            answer.time_taken,
        )
        .await?;
        if stored {
            saved += 1;
        }
    }
    let ignored = req.answers.len() - saved;
    if saved == 0 {
        return Err(AppError::Validation(
            "None of the answers belong to this candidate's questions".into(),
        ));
    }

    info!("Saved {saved} answers for candidate {id} ({ignored} ignored)");
    spawn_evaluate_candidate(state.clone(), id);

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitAnswersResponse {
            message: "Answers submitted successfully. Evaluation in progress.",
            saved,
            ignored,
        }),
    ))
}

/// GET /api/v1/candidates/:id/report
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    let evaluation = queries::find_evaluation(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Evaluation not yet complete".into()))?;
    let report = evaluation
        .report
        .ok_or_else(|| AppError::NotFound("Report not yet generated".into()))?;

    Ok(Json(ReportResponse {
        candidate_id: id,
        report,
        report_key: evaluation.report_key,
        generated_at: evaluation.report_generated_at,
    }))
}
