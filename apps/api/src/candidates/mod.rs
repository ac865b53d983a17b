pub mod handlers;
pub mod queries;

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::pipeline::jobs::{JobStage, JobStatus};
use crate::profiles;
use crate::repository::github::{is_valid_repository_url, normalize_repository_url};

const MAX_NAME_CHARS: usize = 255;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitCandidateRequest {
    pub name: String,
    pub email: String,
    pub github_url: String,
    pub role_type: String,
}

impl SubmitCandidateRequest {
    /// Trims fields, checks them, and canonicalizes the repository URL.
    pub fn validated(self) -> Result<Self, AppError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let github_url = normalize_repository_url(&self.github_url);
        let role_type = self.role_type.trim().to_string();

        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::Validation(format!(
                "name must be at most {MAX_NAME_CHARS} characters"
            )));
        }
        if !email_pattern().is_match(&email) {
            return Err(AppError::Validation("Invalid email format".into()));
        }
        if !is_valid_repository_url(&github_url) {
            return Err(AppError::Validation("Invalid GitHub repository URL".into()));
        }
        if profiles::get_profile(&role_type).is_err() {
            return Err(AppError::Validation(format!(
                "Invalid role type. Must be one of: {}",
                profiles::all_roles().join(", ")
            )));
        }

        Ok(Self {
            name,
            email,
            github_url,
            role_type,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Processing,
    QuestionsReady,
    Evaluating,
    Completed,
    Failed,
}

/// Stored rows take precedence over the job tracker; a failed job is only
/// reported while its outcome is not already visible in the database.
pub fn derive_status(
    has_questions: bool,
    has_evaluation: bool,
    job: Option<&JobStatus>,
) -> CandidateStatus {
    let stage = job.map(|j| j.stage);
    if stage == Some(JobStage::Evaluating) && has_questions {
        return CandidateStatus::Evaluating;
    }
    if has_evaluation {
        return CandidateStatus::Completed;
    }
    if stage == Some(JobStage::Failed) {
        return CandidateStatus::Failed;
    }
    if has_questions {
        CandidateStatus::QuestionsReady
    } else {
        CandidateStatus::Processing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn request(email: &str, url: &str, role: &str) -> SubmitCandidateRequest {
        SubmitCandidateRequest {
            name: "  Grace Hopper ".into(),
            email: email.into(),
            github_url: url.into(),
            role_type: role.into(),
        }
    }

    fn job(stage: JobStage) -> JobStatus {
        JobStatus {
            stage,
            error: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_request_is_normalized() {
        let valid = request("grace@example.com", "https://github.com/grace/cobol/", "Backend")
            .validated()
            .unwrap();
        assert_eq!(valid.name, "Grace Hopper");
        assert_eq!(valid.github_url, "https://github.com/grace/cobol");
    }

    #[test]
    fn test_rejects_bad_email() {
        let err = request("grace@", "https://github.com/g/c", "Backend")
            .validated()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Invalid email format"));
    }

    #[test]
    fn test_rejects_non_github_url() {
        let err = request("g@example.com", "https://gitlab.com/g/c", "Backend")
            .validated()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_rejects_unknown_role_and_lists_roles() {
        let err = request("g@example.com", "https://github.com/g/c", "backend")
            .validated()
            .unwrap_err();
        match err {
            AppError::Validation(m) => assert!(m.contains("Frontend, Backend, ML, DevOps, FullStack")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_precedence() {
        assert_eq!(derive_status(false, false, None), CandidateStatus::Processing);
        assert_eq!(derive_status(true, false, None), CandidateStatus::QuestionsReady);
        assert_eq!(derive_status(true, true, None), CandidateStatus::Completed);
        assert_eq!(
            derive_status(false, false, Some(&job(JobStage::Failed))),
            CandidateStatus::Failed
        );
        assert_eq!(
            derive_status(true, true, Some(&job(JobStage::Failed))),
            CandidateStatus::Completed
        );
        assert_eq!(
            derive_status(true, true, Some(&job(JobStage::Evaluating))),
            CandidateStatus::Evaluating
        );
        assert_eq!(
            derive_status(false, false, Some(&job(JobStage::Cloning))),
            CandidateStatus::Processing
        );
    }
}
