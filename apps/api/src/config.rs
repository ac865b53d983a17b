use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::evaluation::dimensions::ScoringWeights;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub anthropic_base_url: Option<String>,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub repos_dir: PathBuf,
    pub min_questions: usize,
    pub max_questions: usize,
    pub weights: ScoringWeights,
    pub storage: Option<StorageConfig>,
    pub port: u16,
    pub rust_log: String,
}

/// Object storage for JSON reports. Enabled only when bucket and endpoint are both set.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let weights = ScoringWeights {
            understanding: weight_env("WEIGHT_UNDERSTANDING", 0.4)?,
            reasoning: weight_env("WEIGHT_REASONING", 0.3)?,
            communication: weight_env("WEIGHT_COMMUNICATION", 0.2)?,
            logic: weight_env("WEIGHT_LOGIC", 0.1)?,
            relevance: weight_env("WEIGHT_RELEVANCE", 0.1)?,
        };

        let min_questions: usize = env_or("MIN_QUESTIONS", 6)?;
        let max_questions: usize = env_or("MAX_QUESTIONS", 10)?;
        if min_questions == 0 || min_questions > max_questions {
            anyhow::bail!(
                "MIN_QUESTIONS ({min_questions}) must be between 1 and MAX_QUESTIONS ({max_questions})"
            );
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_base_url: optional_env("ANTHROPIC_BASE_URL"),
            github_token: optional_env("GITHUB_TOKEN"),
            github_api_url: optional_env("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            repos_dir: optional_env("REPOS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/repos")),
            min_questions,
            max_questions,
            weights,
            storage: StorageConfig::from_env(),
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl StorageConfig {
    fn from_env() -> Option<Self> {
        let bucket = optional_env("S3_BUCKET")?;
        let endpoint = optional_env("S3_ENDPOINT")?;
        Some(StorageConfig {
            bucket,
            endpoint,
            region: optional_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            access_key_id: optional_env("AWS_ACCESS_KEY_ID").unwrap_or_default(),
            secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

/// A scoring weight: finite and not negative, so aggregate scores stay in range.
fn weight_env(key: &str, default: f64) -> Result<f64> {
    let weight: f64 = env_or(key, default)?;
    if !weight.is_finite() || weight < 0.0 {
        anyhow::bail!("Environment variable '{key}' must be a non-negative number, got {weight}");
    }
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_uses_default_when_unset() {
        let value: u16 = env_or("ASSESSOR_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_env_or_rejects_garbage() {
        std::env::set_var("ASSESSOR_TEST_BAD_WEIGHT", "heavy");
        let result: Result<f64> = env_or("ASSESSOR_TEST_BAD_WEIGHT", 0.4);
        assert!(result.is_err());
        std::env::remove_var("ASSESSOR_TEST_BAD_WEIGHT");
    }

    #[test]
    fn test_optional_env_treats_blank_as_absent() {
        std::env::set_var("ASSESSOR_TEST_BLANK", "   ");
        assert!(optional_env("ASSESSOR_TEST_BLANK").is_none());
        std::env::remove_var("ASSESSOR_TEST_BLANK");
    }

    #[test]
    fn test_weight_env_rejects_negative_weight() {
        std::env::set_var("ASSESSOR_TEST_NEGATIVE_WEIGHT", "-0.2");
        let result = weight_env("ASSESSOR_TEST_NEGATIVE_WEIGHT", 0.1);
        std::env::remove_var("ASSESSOR_TEST_NEGATIVE_WEIGHT");
        assert!(result.unwrap_err().to_string().contains("non-negative"));
    }

    #[test]
    fn test_weight_env_accepts_zero_and_default() {
        std::env::set_var("ASSESSOR_TEST_ZERO_WEIGHT", "0");
        assert_eq!(weight_env("ASSESSOR_TEST_ZERO_WEIGHT", 0.3).unwrap(), 0.0);
        std::env::remove_var("ASSESSOR_TEST_ZERO_WEIGHT");
        assert_eq!(weight_env("ASSESSOR_TEST_UNSET_WEIGHT", 0.3).unwrap(), 0.3);
    }
}
