//! Fraud heuristics. Keyword and length checks run before any LLM call; a positive
//! signal is recorded alongside the score and never blocks scoring.

use serde::{Deserialize, Serialize};

pub const CANNED_PHRASES: &[&str] = &[
    "i don't know",
    "not sure",
    "can't remember",
    "didn't implement",
    "copied from",
    "found online",
];

pub const MIN_ANSWER_CHARS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FraudCheck {
    #[serde(rename = "is_fraud", default)]
    pub flagged: bool,
    #[serde(default)]
    pub reason: String,
}

impl FraudCheck {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn flagged(reason: impl Into<String>) -> Self {
        Self {
            flagged: true,
            reason: reason.into(),
        }
    }
}

/// Deterministic checks. Returns `Some` when a check trips, `None` when the
/// answer needs the LLM classifier.
pub fn heuristic_check(answer: &str) -> Option<FraudCheck> {
    let lower = answer.to_lowercase();
    if let Some(phrase) = CANNED_PHRASES.iter().find(|p| lower.contains(*p)) {
        return Some(FraudCheck::flagged(format!(
            "Generic response detected: '{phrase}'"
        )));
    }

    if answer.trim().chars().count() < MIN_ANSWER_CHARS {
        return Some(FraudCheck::flagged(format!(
            "Answer too short (< {MIN_ANSWER_CHARS} characters)"
        )));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_phrase_is_flagged_case_insensitively() {
        let check = heuristic_check("Honestly I DON'T KNOW how the cache works here.").unwrap();
        assert!(check.flagged);
        assert_eq!(check.reason, "Generic response detected: 'i don't know'");
    }

    #[test]
    fn test_first_matching_phrase_wins() {
        let check = heuristic_check("not sure, I found online a snippet and copied from it").unwrap();
        assert_eq!(check.reason, "Generic response detected: 'not sure'");
    }

    #[test]
    fn test_short_answer_is_flagged() {
        let check = heuristic_check("   uses redis   ").unwrap();
        assert_eq!(check.reason, "Answer too short (< 20 characters)");
    }

    #[test]
    fn test_exactly_twenty_chars_passes_length_check() {
        assert!(heuristic_check("abcdefghijklmnopqrst").is_none());
    }

    #[test]
    fn test_substantive_answer_defers_to_llm() {
        let answer = "The worker pool pulls jobs from a bounded channel so producers block \
                      when the queue is full.";
        assert!(heuristic_check(answer).is_none());
    }

    #[test]
    fn test_llm_reply_shape_deserializes() {
        let check: FraudCheck =
            serde_json::from_str(r#"{"is_fraud": true, "reason": "contradicts the code"}"#)
                .unwrap();
        assert!(check.flagged);
        assert_eq!(check.reason, "contradicts the code");

        let check: FraudCheck = serde_json::from_str("{}").unwrap();
        assert_eq!(check, FraudCheck::clear());
    }
}
