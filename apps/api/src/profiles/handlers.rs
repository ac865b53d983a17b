use std::collections::BTreeMap;

use axum::{extract::Path, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::profiles::{all_roles, all_skills, get_profile, skill_weights};

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<&'static str>,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RoleSkillsResponse {
    pub role_type: &'static str,
    pub description: &'static str,
    pub required_skills: Vec<&'static str>,
    pub optional_skills: Vec<&'static str>,
    /// Required first, then optional.
    pub all_skills: Vec<&'static str>,
    pub skill_weights: BTreeMap<&'static str, f64>,
}

/// GET /api/v1/roles
pub async fn handle_list_roles() -> Json<RolesResponse> {
    Json(RolesResponse {
        roles: all_roles(),
        message: "Available role types for evaluation",
    })
}

/// GET /api/v1/roles/:role_type/skills
pub async fn handle_role_skills(
    Path(role_type): Path<String>,
) -> Result<Json<RoleSkillsResponse>, AppError> {
    let profile = get_profile(&role_type)?;
    Ok(Json(RoleSkillsResponse {
        role_type: profile.role_type,
        description: profile.description,
        required_skills: profile.required_skills.iter().map(|s| s.skill_name).collect(),
        optional_skills: profile.optional_skills.iter().map(|s| s.skill_name).collect(),
        all_skills: all_skills(&role_type)?,
        skill_weights: skill_weights(&role_type)?,
    }))
}
