use serde::{Deserialize, Deserializer, Serialize};

pub const DIMENSION_MIN: f64 = 0.0;
pub const DIMENSION_MAX: f64 = 10.0;
const NEUTRAL: f64 = 5.0;

/// Five 0–10 sub-scores assigned to a single answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionalScore {
    #[serde(deserialize_with = "clamped_dimension")]
    pub concept_understanding: f64,
    #[serde(deserialize_with = "clamped_dimension")]
    pub technical_depth: f64,
    #[serde(deserialize_with = "clamped_dimension")]
    pub accuracy: f64,
    #[serde(deserialize_with = "clamped_dimension")]
    pub communication: f64,
    #[serde(deserialize_with = "clamped_dimension")]
    pub relevance: f64,
}

impl DimensionalScore {
    /// Substituted when the LLM reply cannot be obtained or parsed.
    pub fn neutral() -> Self {
        Self {
            concept_understanding: NEUTRAL,
            technical_depth: NEUTRAL,
            accuracy: NEUTRAL,
            communication: NEUTRAL,
            relevance: NEUTRAL,
        }
    }
}

fn clamped_dimension<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Err(serde::de::Error::custom("dimension score is NaN"));
    }
    Ok(raw.clamp(DIMENSION_MIN, DIMENSION_MAX))
}

/// Coefficients for combining dimensions. `understanding`, `reasoning`,
/// `communication` and `logic` also weight the candidate-level aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub understanding: f64,
    pub reasoning: f64,
    pub communication: f64,
    pub logic: f64,
    pub relevance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            understanding: 0.4,
            reasoning: 0.3,
            communication: 0.2,
            logic: 0.1,
            relevance: 0.1,
        }
    }
}

/// Per-answer composite score on a 0–100 scale.
///
/// understanding ← concept_understanding, reasoning ← technical_depth,
/// logic ← accuracy. The default weights sum to 1.1, so the result is clamped.
pub fn weighted_score(scores: &DimensionalScore, weights: &ScoringWeights) -> f64 {
    let weighted = scores.concept_understanding * weights.understanding
        + scores.technical_depth * weights.reasoning
        + scores.communication * weights.communication
        + scores.accuracy * weights.logic
        + scores.relevance * weights.relevance;

    (weighted / DIMENSION_MAX * 100.0).clamp(0.0, 100.0)
}
