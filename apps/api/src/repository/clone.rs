//! Shallow clones into a per-candidate scratch directory.

use std::path::Path;

use tempfile::TempDir;
use tokio::process::Command;
use tracing::info;
use uuid::Uuid;

use crate::repository::github::{parse_github_url, GithubError};

/// A checked-out repository. The working tree is deleted when this is dropped.
#[derive(Debug)]
pub struct ClonedRepository {
    dir: TempDir,
}

impl ClonedRepository {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Rewrites `https://github.com/...` to carry the token as basic-auth user.
fn authenticated_url(url: &str, token: Option<&str>) -> String {
    match token {
        Some(token) if !token.is_empty() => {
            url.replacen("https://github.com", &format!("https://{token}@github.com"), 1)
        }
        _ => url.to_string(),
    }
}

fn redact(text: &str, token: Option<&str>) -> String {
    match token {
        Some(token) if !token.is_empty() => text.replace(token, "***"),
        _ => text.to_string(),
    }
}

pub async fn clone_repository(
    url: &str,
    candidate_id: Uuid,
    repos_dir: &Path,
    token: Option<&str>,
) -> Result<ClonedRepository, GithubError> {
    let (owner, repo) = parse_github_url(url)?;

    tokio::fs::create_dir_all(repos_dir).await?;
    let dir = tempfile::Builder::new()
        .prefix(&format!("candidate_{candidate_id}_{owner}_{repo}_"))
        .tempdir_in(repos_dir)?;

    info!("Cloning {owner}/{repo} into {}", dir.path().display());

    let output = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg("--quiet")
        .arg(authenticated_url(url, token))
        .arg(dir.path())
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GithubError::Clone(redact(stderr.trim(), token)));
    }

    Ok(ClonedRepository { dir })
}
