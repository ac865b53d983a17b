//! Assessment report: a JSON document assembled after evaluation, stored on the
//! evaluation row and optionally uploaded to object storage.

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::evaluation::dimensions::DimensionalScore;
use crate::evaluation::overall::{HireRecommendation, OverallScores};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateSection {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role_type: String,
    pub github_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositorySection {
    pub name: String,
    pub url: String,
    pub summary: String,
    pub purpose: String,
    pub tech_stack: Vec<String>,
    pub skill_match: f64,
    pub stars: i32,
    pub forks: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionSection {
    pub question_id: Uuid,
    pub question: String,
    pub question_type: String,
    pub difficulty: String,
    pub answer: String,
    pub scores: DimensionalScore,
    pub weighted_score: f64,
    pub feedback: String,
    pub fraud_flag: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportData {
    pub candidate: CandidateSection,
    pub repository: Option<RepositorySection>,
    pub evaluations: Vec<QuestionSection>,
    pub scores: OverallScores,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: String,
    pub hire_recommendation: HireRecommendation,
    pub confidence: f64,
    pub fraud_detected: bool,
    pub fraud_signals: Vec<String>,
    pub evaluation_date: DateTime<Utc>,
    pub total_questions: usize,
}

pub fn recommendation_text(recommendation: HireRecommendation, role_type: &str) -> String {
    format!(
        "Based on the evaluation, this candidate demonstrates {} fit for the {role_type} role.",
        recommendation.as_str().replace('_', " ")
    )
}

pub fn report_key(candidate_id: Uuid, generated_at: DateTime<Utc>) -> String {
    format!(
        "reports/{candidate_id}/{}.json",
        generated_at.format("%Y%m%dT%H%M%SZ")
    )
}

/// Uploads the report as pretty JSON and returns its object key.
pub async fn upload_report(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    report: &ReportData,
) -> Result<String> {
    let key = report_key(report.candidate.id, report.evaluation_date);
    let body = serde_json::to_vec_pretty(report)?;

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(body))
        .content_type("application/json")
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

    info!("Uploaded report to s3://{bucket}/{key}");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_recommendation_text_spells_out_bucket() {
        assert_eq!(
            recommendation_text(HireRecommendation::StrongYes, "Backend"),
            "Based on the evaluation, this candidate demonstrates strong yes fit for the Backend role."
        );
        assert_eq!(
            recommendation_text(HireRecommendation::Maybe, "ML"),
            "Based on the evaluation, this candidate demonstrates maybe fit for the ML role."
        );
    }

    #[test]
    fn test_report_key_layout() {
        let id = Uuid::nil();
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap();
        assert_eq!(
            report_key(id, at),
            "reports/00000000-0000-0000-0000-000000000000/20261015T093000Z.json"
        );
    }

    #[test]
    fn test_report_serializes_recommendation_snake_case() {
        let report = ReportData {
            candidate: CandidateSection {
                id: Uuid::nil(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role_type: "Backend".into(),
                github_url: "https://github.com/ada/engine".into(),
            },
            repository: None,
            evaluations: vec![],
            scores: OverallScores::default(),
            strengths: vec![],
            weaknesses: vec![],
            recommendations: recommendation_text(HireRecommendation::StrongNo, "Backend"),
            hire_recommendation: HireRecommendation::StrongNo,
            confidence: 0.1,
            fraud_detected: false,
            fraud_signals: vec![],
            evaluation_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            total_questions: 0,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["hire_recommendation"], "strong_no");
        assert_eq!(json["scores"]["overall_score"], 0.0);
        assert!(json["repository"].is_null());
    }
}
