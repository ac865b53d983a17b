//! Role skill profiles: lookup of role archetypes and the skill-match heuristic.

pub mod catalog;
pub mod handlers;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::profiles::catalog::{RoleProfile, ROLE_PROFILES};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Unknown role type: {role}. Available: {available}")]
    UnknownRole { role: String, available: String },
}

/// Looks up a role profile by its exact role type (e.g. "Backend").
pub fn get_profile(role_type: &str) -> Result<&'static RoleProfile, ProfileError> {
    ROLE_PROFILES
        .iter()
        .find(|p| p.role_type == role_type)
        .ok_or_else(|| ProfileError::UnknownRole {
            role: role_type.to_string(),
            available: all_roles().join(", "),
        })
}

pub fn all_roles() -> Vec<&'static str> {
    ROLE_PROFILES.iter().map(|p| p.role_type).collect()
}

pub fn required_skills(role_type: &str) -> Result<Vec<&'static str>, ProfileError> {
    let profile = get_profile(role_type)?;
    Ok(profile.required_skills.iter().map(|s| s.skill_name).collect())
}

pub fn all_skills(role_type: &str) -> Result<Vec<&'static str>, ProfileError> {
    let profile = get_profile(role_type)?;
    Ok(profile.skills().map(|s| s.skill_name).collect())
}

pub fn skill_weights(role_type: &str) -> Result<BTreeMap<&'static str, f64>, ProfileError> {
    let profile = get_profile(role_type)?;
    Ok(profile.skills().map(|s| (s.skill_name, s.weight)).collect())
}

/// Percentage (0–100) of the role's skill weight covered by `detected`.
///
/// A skill counts as matched when any detected string is a case-insensitive
/// substring of the skill name, or the skill name is a substring of it.
/// Blank detected strings are ignored.
pub fn skill_match(role_type: &str, detected: &[String]) -> Result<f64, ProfileError> {
    let profile = get_profile(role_type)?;
    Ok(match_percentage(profile, detected))
}

fn match_percentage(profile: &RoleProfile, detected: &[String]) -> f64 {
    let detected: Vec<String> = detected
        .iter()
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect();

    let mut total_weight = 0.0_f64;
    let mut matched_weight = 0.0_f64;

    for skill in profile.skills() {
        total_weight += skill.weight;
        let skill_lower = skill.skill_name.to_lowercase();
        if detected
            .iter()
            .any(|d| skill_lower.contains(d.as_str()) || d.contains(skill_lower.as_str()))
        {
            matched_weight += skill.weight;
        }
    }

    if total_weight > 0.0 {
        (matched_weight / total_weight * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_get_profile_known_role() {
        let profile = get_profile("Backend").unwrap();
        assert_eq!(profile.role_type, "Backend");
        assert_eq!(profile.required_skills.len(), 6);
    }

    #[test]
    fn test_get_profile_unknown_role_lists_available() {
        let err = get_profile("Designer").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Designer"));
        assert!(msg.contains("Frontend, Backend, ML, DevOps, FullStack"));
    }

    #[test]
    fn test_role_lookup_is_case_sensitive() {
        assert!(get_profile("backend").is_err());
    }

    #[test]
    fn test_all_skills_includes_optional() {
        let required = required_skills("DevOps").unwrap();
        let all = all_skills("DevOps").unwrap();
        assert_eq!(required.len(), 6);
        assert_eq!(all.len(), 10);
        assert!(all.contains(&"Kubernetes"));
        assert!(!required.contains(&"Kubernetes"));
    }

    #[test]
    fn test_skill_weights_map() {
        let weights = skill_weights("ML").unwrap();
        assert_eq!(weights.get("Model Training"), Some(&0.25));
        assert_eq!(weights.get("MLOps"), Some(&0.08));
    }

    #[test]
    fn test_empty_detected_is_zero() {
        assert_eq!(skill_match("Frontend", &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_blank_detected_strings_are_ignored() {
        assert_eq!(skill_match("Frontend", &strings(&["", "   "])).unwrap(), 0.0);
    }

    #[test]
    fn test_detected_substring_of_skill_matches() {
        // "react" ⊂ "React" (0.25); total Frontend weight = 1.26
        let pct = skill_match("Frontend", &strings(&["react"])).unwrap();
        assert!((pct - 0.25 / 1.26 * 100.0).abs() < 1e-9, "got {pct}");
    }

    #[test]
    fn test_skill_substring_of_detected_matches() {
        // "kubernetes" ⊂ "kubernetes (k8s) manifests"
        let pct = skill_match("DevOps", &strings(&["Kubernetes (k8s) manifests"])).unwrap();
        assert!(pct > 0.0);
    }

    #[test]
    fn test_one_detected_string_can_match_several_skills() {
        // "javascript" is inside "JavaScript/TypeScript" only; "state" hits "State Management"
        let pct = skill_match("FullStack", &strings(&["javascript", "state"])).unwrap();
        let total = 0.18 + 0.18 + 0.15 + 0.15 + 0.12 + 0.12 + 0.10 + 0.08 + 0.07 + 0.06;
        let expected = (0.12 + 0.10) / total * 100.0;
        assert!((pct - expected).abs() < 1e-9, "got {pct}, expected {expected}");
    }

    #[test]
    fn test_full_coverage_is_hundred() {
        let every: Vec<String> = all_skills("ML")
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        let pct = skill_match("ML", &every).unwrap();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_role_errors() {
        assert!(skill_match("Designer", &strings(&["react"])).is_err());
    }

    proptest! {
        #[test]
        fn prop_skill_match_is_a_percentage(
            role_idx in 0usize..5,
            detected in proptest::collection::vec(".{0,24}", 0..12),
        ) {
            let role = all_roles()[role_idx];
            let pct = skill_match(role, &detected).unwrap();
            prop_assert!((0.0..=100.0).contains(&pct));
        }
    }
}
