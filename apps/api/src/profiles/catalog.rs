//! Static role catalog. Weights are per-skill contributions to the match percentage;
//! they are not required to sum to 1 within a role.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    #[allow(dead_code)]
    Soft,
    Tool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillProfile {
    pub skill_name: &'static str,
    pub weight: f64,
    pub required: bool,
    pub category: SkillCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleProfile {
    pub role_type: &'static str,
    pub description: &'static str,
    pub required_skills: &'static [SkillProfile],
    pub optional_skills: &'static [SkillProfile],
}

impl RoleProfile {
    /// Required skills followed by optional skills.
    pub fn skills(&self) -> impl Iterator<Item = &SkillProfile> {
        self.required_skills.iter().chain(self.optional_skills.iter())
    }
}

const fn req(skill_name: &'static str, weight: f64, category: SkillCategory) -> SkillProfile {
    SkillProfile {
        skill_name,
        weight,
        required: true,
        category,
    }
}

const fn opt(skill_name: &'static str, weight: f64, category: SkillCategory) -> SkillProfile {
    SkillProfile {
        skill_name,
        weight,
        required: false,
        category,
    }
}

use SkillCategory::{Technical, Tool};

pub static ROLE_PROFILES: &[RoleProfile] = &[
    RoleProfile {
        role_type: "Frontend",
        description: "Frontend Development Internship - Focus on UI/UX and client-side development",
        required_skills: &[
            req("React", 0.25, Technical),
            req("JavaScript/TypeScript", 0.20, Technical),
            req("HTML/CSS", 0.15, Technical),
            req("State Management", 0.15, Technical),
            req("API Integration", 0.15, Technical),
            req("Responsive Design", 0.10, Technical),
        ],
        optional_skills: &[
            opt("Next.js", 0.08, Technical),
            opt("Testing (Jest/Vitest)", 0.07, Technical),
            opt("UI Frameworks (Tailwind/MUI)", 0.06, Tool),
            opt("Performance Optimization", 0.05, Technical),
        ],
    },
    RoleProfile {
        role_type: "Backend",
        description: "Backend Development Internship - Focus on server-side logic and APIs",
        required_skills: &[
            req("FastAPI/Flask/Django", 0.20, Technical),
            req("RESTful API Design", 0.18, Technical),
            req("Database (SQL/NoSQL)", 0.18, Technical),
            req("Authentication & Authorization", 0.15, Technical),
            req("Python/Node.js", 0.15, Technical),
            req("Error Handling", 0.10, Technical),
        ],
        optional_skills: &[
            opt("Microservices", 0.08, Technical),
            opt("Caching (Redis)", 0.07, Technical),
            opt("Message Queues", 0.06, Technical),
            opt("API Documentation", 0.05, Technical),
        ],
    },
    RoleProfile {
        role_type: "ML",
        description: "Machine Learning Internship - Focus on ML models and data science",
        required_skills: &[
            req("Model Training", 0.25, Technical),
            req("Model Evaluation", 0.20, Technical),
            req("Data Preprocessing", 0.18, Technical),
            req("Python ML Libraries", 0.15, Tool),
            req("Feature Engineering", 0.12, Technical),
            req("Model Optimization", 0.10, Technical),
        ],
        optional_skills: &[
            opt("Deep Learning (PyTorch/TensorFlow)", 0.10, Technical),
            opt("MLOps", 0.08, Technical),
            opt("Computer Vision/NLP", 0.08, Technical),
            opt("Model Deployment", 0.07, Technical),
        ],
    },
    RoleProfile {
        role_type: "DevOps",
        description: "DevOps Internship - Focus on CI/CD, infrastructure, and automation",
        required_skills: &[
            req("CI/CD Pipelines", 0.25, Technical),
            req("Docker/Containerization", 0.20, Tool),
            req("Cloud Platform (AWS/Azure/GCP)", 0.18, Tool),
            req("Infrastructure as Code", 0.15, Technical),
            req("Scripting (Bash/Python)", 0.12, Technical),
            req("Monitoring & Logging", 0.10, Technical),
        ],
        optional_skills: &[
            opt("Kubernetes", 0.10, Tool),
            opt("Terraform/Ansible", 0.08, Tool),
            opt("Security Best Practices", 0.07, Technical),
            opt("Performance Tuning", 0.06, Technical),
        ],
    },
    RoleProfile {
        role_type: "FullStack",
        description: "Full Stack Development Internship - Frontend + Backend",
        required_skills: &[
            req("Frontend Framework", 0.18, Technical),
            req("Backend Framework", 0.18, Technical),
            req("API Development", 0.15, Technical),
            req("Database", 0.15, Technical),
            req("JavaScript/TypeScript", 0.12, Technical),
            req("Authentication", 0.12, Technical),
            req("State Management", 0.10, Technical),
        ],
        optional_skills: &[
            opt("DevOps Basics", 0.08, Technical),
            opt("Testing", 0.07, Technical),
            opt("Microservices", 0.06, Technical),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_five_roles() {
        let roles: Vec<_> = ROLE_PROFILES.iter().map(|p| p.role_type).collect();
        assert_eq!(roles, ["Frontend", "Backend", "ML", "DevOps", "FullStack"]);
    }

    #[test]
    fn test_required_flags_match_lists() {
        for profile in ROLE_PROFILES {
            assert!(profile.required_skills.iter().all(|s| s.required));
            assert!(profile.optional_skills.iter().all(|s| !s.required));
        }
    }

    #[test]
    fn test_weights_are_fractions() {
        for skill in ROLE_PROFILES.iter().flat_map(|p| p.skills()) {
            assert!(
                skill.weight > 0.0 && skill.weight <= 1.0,
                "{} has weight {}",
                skill.skill_name,
                skill.weight
            );
        }
    }

    #[test]
    fn test_skills_lists_required_first() {
        let frontend = &ROLE_PROFILES[0];
        let names: Vec<_> = frontend.skills().map(|s| s.skill_name).collect();
        assert_eq!(names.first(), Some(&"React"));
        assert_eq!(names.last(), Some(&"Performance Optimization"));
        assert_eq!(names.len(), 10);
    }
}
