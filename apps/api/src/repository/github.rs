//! GitHub URL handling and repository metadata via the REST API.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("assessor/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Invalid GitHub repository URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Repository {0} not found or not accessible")]
    NotFound(String),

    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("git clone failed: {0}")]
    Clone(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn submission_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://github\.com/[\w-]+/[\w.-]+/?$").expect("valid GitHub URL regex")
    })
}

fn owner_repo_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"github\.com/([^/]+)/([^/]+)").expect("valid owner/repo regex"))
}

/// Accepts `https://github.com/<owner>/<repo>` with an optional trailing slash.
pub fn is_valid_repository_url(url: &str) -> bool {
    submission_pattern().is_match(url.trim_end_matches('/'))
}

/// Canonical form stored for a submission: no trailing slash.
pub fn normalize_repository_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Extracts `(owner, repo)`; a trailing slash and `.git` suffix are ignored.
pub fn parse_github_url(url: &str) -> Result<(String, String), GithubError> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let captures = owner_repo_pattern()
        .captures(trimmed)
        .ok_or_else(|| GithubError::InvalidUrl(url.to_string()))?;

    Ok((captures[1].to_string(), captures[2].to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryInfo {
    pub repo_name: String,
    pub repo_url: String,
    pub owner: String,
    pub description: Option<String>,
    /// Language → bytes of code, as reported by GitHub.
    pub languages: BTreeMap<String, u64>,
    pub stars: u32,
    pub forks: u32,
    pub last_commit: Option<DateTime<Utc>>,
    pub default_branch: String,
    pub is_private: bool,
    pub size_kb: u64,
}

impl RepositoryInfo {
    /// Metadata derivable from the URL alone, used when no API token is configured.
    fn from_url(url: &str, owner: String, repo_name: String) -> Self {
        Self {
            repo_name,
            repo_url: normalize_repository_url(url),
            owner,
            description: None,
            languages: BTreeMap::new(),
            stars: 0,
            forks: 0,
            last_commit: None,
            default_branch: "main".to_string(),
            is_private: false,
            size_kb: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
    html_url: String,
    owner: ApiOwner,
    description: Option<String>,
    stargazers_count: u32,
    forks_count: u32,
    pushed_at: Option<DateTime<Utc>>,
    default_branch: String,
    private: bool,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct ApiOwner {
    login: String,
}

#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self, GithubError> {
        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .build()?,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Fetches repository metadata. Without a token only URL-derived fields are filled.
    pub async fn repository_info(&self, url: &str) -> Result<RepositoryInfo, GithubError> {
        let (owner, repo_name) = parse_github_url(url)?;

        if self.token.is_none() {
            debug!("No GitHub token configured; using URL-derived info for {owner}/{repo_name}");
            return Ok(RepositoryInfo::from_url(url, owner, repo_name));
        }

        let full_name = format!("{owner}/{repo_name}");
        let repo: ApiRepository = self.get_json(&format!("/repos/{full_name}"), &full_name).await?;
        let languages: BTreeMap<String, u64> = self
            .get_json(&format!("/repos/{full_name}/languages"), &full_name)
            .await?;

        info!(
            "Fetched GitHub metadata for {full_name}: {} stars, {} languages",
            repo.stargazers_count,
            languages.len()
        );

        Ok(RepositoryInfo {
            repo_name: repo.name,
            repo_url: repo.html_url,
            owner: repo.owner.login,
            description: repo.description,
            languages,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            last_commit: repo.pushed_at,
            default_branch: repo.default_branch,
            is_private: repo.private,
            size_kb: repo.size,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        full_name: &str,
    ) -> Result<T, GithubError> {
        let mut request = self
            .http
            .get(format!("{}{}", self.api_url, path))
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GithubError::NotFound(full_name.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GithubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
