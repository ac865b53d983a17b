//! Candidate pipeline: two background jobs, each one sequential task.
//!
//! `process_repository`: metadata → clone → analyze → persist → index → questions.
//! `evaluate_candidate`: score each answer → aggregate → recommend → report.
//!
//! A failure aborts the job and is recorded in the job tracker. There are no
//! retries here; the LLM client's transport retries are the only ones.

pub mod jobs;
pub mod persist;

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::candidates::queries;
use crate::evaluation::overall::{calculate_overall_score, generate_recommendation};
use crate::evaluation::service::AnswerInput;
use crate::pipeline::jobs::JobStage;
use crate::pipeline::persist::{EvaluationRecord, RepositoryRecord};
use crate::profiles;
use crate::questions::generator::{generate_questions, QuestionRequest};
use crate::rag::{self, context_text, retrieve_context};
use crate::report::{
    recommendation_text, upload_report, CandidateSection, QuestionSection, ReportData,
    RepositorySection,
};
use crate::repository::analysis::{analyze_project, ProjectAnalysis};
use crate::repository::clone::clone_repository;
use crate::state::AppState;

const README_PURPOSE_CHARS: usize = 500;
const QUESTION_CONTEXT_QUERY: &str = "main functionality features implementation";
const QUESTION_CONTEXT_RESULTS: usize = 5;
const ANSWER_CONTEXT_RESULTS: usize = 3;

pub fn spawn_process_repository(state: AppState, candidate_id: Uuid, github_url: String, role_type: String) {
    tokio::spawn(async move {
        state.jobs.mark(candidate_id, JobStage::Queued, None).await;
        if let Err(e) = process_repository(&state, candidate_id, &github_url, &role_type).await {
            error!("Repository processing failed for candidate {candidate_id}: {e:#}");
            state
                .jobs
                .mark(candidate_id, JobStage::Failed, Some(format!("{e:#}")))
                .await;
        }
    });
}

pub fn spawn_evaluate_candidate(state: AppState, candidate_id: Uuid) {
    tokio::spawn(async move {
        if let Err(e) = evaluate_candidate(&state, candidate_id).await {
            error!("Evaluation failed for candidate {candidate_id}: {e:#}");
            state
                .jobs
                .mark(candidate_id, JobStage::Failed, Some(format!("{e:#}")))
                .await;
        }
    });
}

pub async fn process_repository(
    state: &AppState,
    candidate_id: Uuid,
    github_url: &str,
    role_type: &str,
) -> Result<()> {
    info!("Starting repository processing for candidate {candidate_id}");

    state.jobs.mark(candidate_id, JobStage::Cloning, None).await;
    let info = state
        .github
        .repository_info(github_url)
        .await
        .context("fetching repository metadata")?;
    let cloned = clone_repository(
        github_url,
        candidate_id,
        &state.config.repos_dir,
        state.github.token(),
    )
    .await
    .context("cloning repository")?;

    state.jobs.mark(candidate_id, JobStage::Analyzing, None).await;
    let root = cloned.path().to_path_buf();
    let analysis = tokio::task::spawn_blocking(move || analyze_project(&root))
        .await
        .context("analysis task failed")?
        .context("analyzing repository")?;
    // Everything needed downstream is in memory now.
    drop(cloned);

    let tech_stack = analysis.detected_skills();
    let skill_match = profiles::skill_match(role_type, &tech_stack)?;
    let project_summary = project_summary(github_url, &analysis);
    let purpose = readme_purpose(analysis.readme.as_deref());
    info!(
        "Analyzed {} source files for candidate {candidate_id}; skill match {skill_match:.1}%",
        analysis.total_files
    );

    persist::upsert_repository(
        &state.db,
        candidate_id,
        RepositoryRecord {
            info: &info,
            analysis: &analysis,
            tech_stack: &tech_stack,
            project_summary: &project_summary,
            purpose: &purpose,
            skill_match,
        },
    )
    .await
    .context("saving repository analysis")?;

    state.jobs.mark(candidate_id, JobStage::Indexing, None).await;
    let chunks = rag::build_chunks(&analysis);
    if chunks.is_empty() {
        warn!("No chunks created for candidate {candidate_id}");
    }
    let stored = state
        .chunk_store
        .replace_chunks(candidate_id, &chunks)
        .await
        .context("indexing repository chunks")?;
    info!("Indexed {stored} chunks for candidate {candidate_id}");

    state
        .jobs
        .mark(candidate_id, JobStage::GeneratingQuestions, None)
        .await;
    let items = retrieve_context(
        state.chunk_store.as_ref(),
        candidate_id,
        QUESTION_CONTEXT_QUERY,
        QUESTION_CONTEXT_RESULTS,
    )
    .await;
    let code_context = if items.is_empty() {
        rag::project_overview_context(state.chunk_store.as_ref(), candidate_id).await
    } else {
        context_text(&items)
    };

    let required_skills = profiles::required_skills(role_type)?;
    let questions = generate_questions(
        &state.llm,
        &QuestionRequest {
            role_type,
            required_skills: &required_skills,
            project_summary: &project_summary,
            purpose: &purpose,
            code_context: &code_context,
            min_questions: state.config.min_questions,
            max_questions: state.config.max_questions,
        },
    )
    .await
    .context("generating interview questions")?;

    persist::replace_questions(&state.db, candidate_id, &questions)
        .await
        .context("saving questions")?;

    state.jobs.mark(candidate_id, JobStage::QuestionsReady, None).await;
    info!(
        "Repository processing complete for candidate {candidate_id}: {} questions",
        questions.len()
    );
    Ok(())
}

pub async fn evaluate_candidate(state: &AppState, candidate_id: Uuid) -> Result<()> {
    info!("Starting evaluation for candidate {candidate_id}");
    state.jobs.mark(candidate_id, JobStage::Evaluating, None).await;

    let candidate = queries::find_candidate(&state.db, candidate_id)
        .await?
        .with_context(|| format!("candidate {candidate_id} not found"))?;
    let repository = queries::find_repository(&state.db, candidate_id).await?;
    let questions = queries::list_questions(&state.db, candidate_id).await?;

    let project_summary = repository
        .as_ref()
        .map(|r| r.project_summary.clone())
        .unwrap_or_default();

    let mut evaluations = Vec::new();
    let mut sections = Vec::new();
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut fraud_signals = Vec::new();

    for question in &questions {
        let Some(answer) = question
            .answer_text
            .as_deref()
            .filter(|a| !a.trim().is_empty())
        else {
            continue;
        };

        let items = retrieve_context(
            state.chunk_store.as_ref(),
            candidate_id,
            &question.question_text,
            ANSWER_CONTEXT_RESULTS,
        )
        .await;
        let code_context = if items.is_empty() {
            fallback_context(&project_summary)
        } else {
            context_text(&items)
        };

        let evaluation = state
            .evaluator
            .evaluate(&AnswerInput {
                question_id: question.id,
                question: &question.question_text,
                question_type: &question.question_type,
                expected_keywords: &question.expected_keywords,
                answer,
                code_context: &code_context,
                project_summary: &project_summary,
            })
            .await;

        if let Some(reason) = &evaluation.fraud_reason {
            fraud_signals.push(fraud_signal(question.id, reason));
        }
        strengths.extend(evaluation.strengths.iter().cloned());
        weaknesses.extend(evaluation.weaknesses.iter().cloned());
        sections.push(QuestionSection {
            question_id: question.id,
            question: question.question_text.clone(),
            question_type: question.question_type.clone(),
            difficulty: question.difficulty.clone(),
            answer: answer.to_string(),
            scores: evaluation.scores,
            weighted_score: evaluation.weighted_score,
            feedback: evaluation.feedback.clone(),
            fraud_flag: evaluation.fraud_flag,
        });
        evaluations.push(evaluation);
    }

    if evaluations.is_empty() {
        warn!("Candidate {candidate_id} has no answered questions; scores will be zero");
    }
    let replaced = persist::replace_scores(&state.db, candidate_id, &evaluations)
        .await
        .context("saving question scores")?;
    info!(
        "Saved {} scores for candidate {candidate_id} ({replaced} replaced)",
        evaluations.len()
    );

    let scores = calculate_overall_score(&evaluations, state.evaluator.weights());
    let (hire_recommendation, confidence) = generate_recommendation(scores.overall_score);
    let recommendations = recommendation_text(hire_recommendation, &candidate.role_type);
    let strengths = dedupe(strengths);
    let weaknesses = dedupe(weaknesses);
    let generated_at = Utc::now();

    let report = ReportData {
        candidate: CandidateSection {
            id: candidate.id,
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            role_type: candidate.role_type.clone(),
            github_url: candidate.github_url.clone(),
        },
        repository: repository.as_ref().map(|r| RepositorySection {
            name: r.repo_name.clone(),
            url: r.repo_url.clone(),
            summary: r.project_summary.clone(),
            purpose: r.purpose.clone(),
            tech_stack: r.tech_stack.clone(),
            skill_match: r.skill_match,
            stars: r.stars,
            forks: r.forks,
        }),
        evaluations: sections,
        scores,
        strengths: strengths.clone(),
        weaknesses: weaknesses.clone(),
        recommendations: recommendations.clone(),
        hire_recommendation,
        confidence,
        fraud_detected: !fraud_signals.is_empty(),
        fraud_signals: fraud_signals.clone(),
        evaluation_date: generated_at,
        total_questions: questions.len(),
    };
    let report_json = serde_json::to_value(&report).context("serializing report")?;

    persist::upsert_evaluation(
        &state.db,
        candidate_id,
        EvaluationRecord {
            scores: &scores,
            strengths: &strengths,
            weaknesses: &weaknesses,
            recommendations: &recommendations,
            hire_recommendation,
            confidence,
            fraud_signals: &fraud_signals,
            report: &report_json,
            generated_at,
        },
    )
    .await
    .context("saving evaluation")?;

    if let (Some(s3), Some(storage)) = (&state.s3, &state.config.storage) {
        match upload_report(s3, &storage.bucket, &report).await {
            Ok(key) => persist::set_report_key(&state.db, candidate_id, &key).await?,
            Err(e) => warn!("Report upload failed for candidate {candidate_id}: {e:#}"),
        }
    }

    state.jobs.mark(candidate_id, JobStage::Completed, None).await;
    info!(
        "Evaluation complete for candidate {candidate_id}: {:.2} ({})",
        scores.overall_score,
        hire_recommendation.as_str()
    );
    Ok(())
}

/// `Repository: <url>` / `Languages: a, b` / `Files: n`.
pub fn project_summary(github_url: &str, analysis: &ProjectAnalysis) -> String {
    let languages: Vec<&str> = analysis.languages.keys().map(String::as_str).collect();
    format!(
        "Repository: {github_url}\nLanguages: {}\nFiles: {}",
        languages.join(", "),
        analysis.total_files
    )
}

/// First 500 characters of the README.
pub fn readme_purpose(readme: Option<&str>) -> String {
    match readme {
        Some(text) if !text.is_empty() => text.chars().take(README_PURPOSE_CHARS).collect(),
        _ => "No README found".to_string(),
    }
}

fn fallback_context(project_summary: &str) -> String {
    if project_summary.is_empty() {
        "No context available".to_string()
    } else {
        project_summary.to_string()
    }
}

pub fn fraud_signal(question_id: Uuid, reason: &str) -> String {
    format!("Q{question_id}: {reason}")
}

/// Keeps the first occurrence of each entry.
pub fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_project_summary_format() {
        let analysis = ProjectAnalysis {
            total_files: 7,
            languages: BTreeMap::from([("Python".to_string(), 5), ("Go".to_string(), 2)]),
            ..Default::default()
        };
        assert_eq!(
            project_summary("https://github.com/o/r", &analysis),
            "Repository: https://github.com/o/r\nLanguages: Go, Python\nFiles: 7"
        );
    }

    #[test]
    fn test_readme_purpose_truncates_on_chars() {
        let readme = "é".repeat(600);
        let purpose = readme_purpose(Some(&readme));
        assert_eq!(purpose.chars().count(), 500);
        assert_eq!(readme_purpose(None), "No README found");
        assert_eq!(readme_purpose(Some("")), "No README found");
    }

    #[test]
    fn test_fraud_signal_format() {
        let id = Uuid::nil();
        assert_eq!(
            fraud_signal(id, "Answer too short (< 20 characters)"),
            "Q00000000-0000-0000-0000-000000000000: Answer too short (< 20 characters)"
        );
    }

    #[test]
    fn test_dedupe_preserves_first_occurrence() {
        let items = vec!["b", "a", "b", "c", "a"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dedupe(items), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_fallback_context() {
        assert_eq!(fallback_context(""), "No context available");
        assert_eq!(fallback_context("Repository: x"), "Repository: x");
    }
}
