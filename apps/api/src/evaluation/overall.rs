//! Candidate-level aggregation across all scored answers, and the hiring ladder.

use serde::{Deserialize, Serialize};

use crate::evaluation::dimensions::{ScoringWeights, DIMENSION_MAX};
use crate::evaluation::QuestionEvaluation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HireRecommendation {
    StrongYes,
    Yes,
    Maybe,
    No,
    StrongNo,
}

impl HireRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            HireRecommendation::StrongYes => "strong_yes",
            HireRecommendation::Yes => "yes",
            HireRecommendation::Maybe => "maybe",
            HireRecommendation::No => "no",
            HireRecommendation::StrongNo => "strong_no",
        }
    }

    /// Fixed confidence attached to each bucket.
    pub fn confidence(&self) -> f64 {
        match self {
            HireRecommendation::StrongYes => 0.95,
            HireRecommendation::Yes => 0.80,
            HireRecommendation::Maybe => 0.60,
            HireRecommendation::No => 0.30,
            HireRecommendation::StrongNo => 0.10,
        }
    }
}

/// All fields are on a 0–100 scale, rounded to two decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallScores {
    pub overall_score: f64,
    pub understanding_score: f64,
    pub reasoning_score: f64,
    pub communication_score: f64,
    pub logic_score: f64,
}

/// Averages each dimension across answers and combines them with the
/// understanding/reasoning/communication/logic weights. Relevance is not part
/// of the aggregate.
pub fn calculate_overall_score(
    evaluations: &[QuestionEvaluation],
    weights: &ScoringWeights,
) -> OverallScores {
    if evaluations.is_empty() {
        return OverallScores::default();
    }

    let n = evaluations.len() as f64;
    let mean = |f: fn(&QuestionEvaluation) -> f64| -> f64 {
        evaluations.iter().map(f).sum::<f64>() / n * DIMENSION_MAX
    };

    let understanding = mean(|e| e.scores.concept_understanding);
    let reasoning = mean(|e| e.scores.technical_depth);
    let communication = mean(|e| e.scores.communication);
    let logic = mean(|e| e.scores.accuracy);

    let overall = understanding * weights.understanding
        + reasoning * weights.reasoning
        + communication * weights.communication
        + logic * weights.logic;

    OverallScores {
        overall_score: round2(overall),
        understanding_score: round2(understanding),
        reasoning_score: round2(reasoning),
        communication_score: round2(communication),
        logic_score: round2(logic),
    }
}

pub fn generate_recommendation(overall_score: f64) -> (HireRecommendation, f64) {
    let recommendation = if overall_score >= 85.0 {
        HireRecommendation::StrongYes
    } else if overall_score >= 75.0 {
        HireRecommendation::Yes
    } else if overall_score >= 60.0 {
        HireRecommendation::Maybe
    } else if overall_score >= 40.0 {
        HireRecommendation::No
    } else {
        HireRecommendation::StrongNo
    };
    (recommendation, recommendation.confidence())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
